// crates/oee-config-server/src/lib.rs
// ============================================================================
// Module: OEE Config Server
// Description: HTTP surface for the environment and OEE config documents.
// Purpose: Route requests to the document accessors and map their errors.
// Dependencies: oee-config-store, axum, tokio
// ============================================================================

//! ## Overview
//! The server exposes `GET`/`POST` on `/env` and `/oee-config`. Handlers are
//! thin wrappers over [`oee_config_store::EnvStore`] and
//! [`oee_config_store::OeeConfigStore`]; every failure is reported with the
//! same JSON error envelope keyed by [`oee_config_store::StoreErrorKind`].
//! The endpoints are unauthenticated.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod handlers;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AccessAuditEvent;
pub use audit::AccessAuditSink;
pub use audit::AccessOutcome;
pub use audit::DocumentKind;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ServiceNoticeEvent;
pub use audit::StderrAuditSink;
pub use handlers::ENV_SAVED_MESSAGE;
pub use handlers::OEE_CONFIG_SAVED_MESSAGE;
pub use handlers::ROUTE_ENV;
pub use handlers::ROUTE_OEE_CONFIG;
pub use server::ConfigServer;
pub use server::ServerError;
