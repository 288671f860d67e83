// crates/oee-config-store/src/lib.rs
// ============================================================================
// Module: OEE Config Store Library
// Description: File-backed accessors for the environment, OEE, and process
//              order documents.
// Purpose: Single source of truth for document I/O and service configuration.
// Dependencies: serde, serde_json, tempfile, thiserror, tokio, toml
// ============================================================================

//! ## Overview
//! `oee-config-store` owns every read and write the service performs against
//! local disk. Each accessor is constructed from explicit configuration and
//! keeps no state between calls: reads always hit disk and writes always
//! replace the whole document.
//!
//! All accessors report failures through [`StoreError`], whose
//! [`StoreErrorKind`] gives callers a single classification to map onto
//! their own error surface.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env_store;
pub mod error;
pub mod oee_config;
pub mod process_order;
pub mod write;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::ConfigError;
pub use config::ProcessOrderConfig;
pub use config::ServerConfig;
pub use config::ServiceConfig;
pub use config::StorageConfig;
pub use env_store::EnvStore;
pub use error::StoreError;
pub use error::StoreErrorKind;
pub use oee_config::OeeConfigStore;
pub use process_order::ProcessOrderLoader;
pub use write::WriteMode;
