// crates/oee-config-server/src/server.rs
// ============================================================================
// Module: Config Server
// Description: HTTP server wiring for the document routes.
// Purpose: Build accessors from configuration and serve them over axum.
// Dependencies: oee-config-store, axum, tokio
// ============================================================================

//! ## Overview
//! [`ConfigServer`] turns a validated [`ServiceConfig`] into an axum router
//! and serves it. Accessors are constructed once from the configured paths;
//! no document content is held between requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use oee_config_store::EnvStore;
use oee_config_store::OeeConfigStore;
use oee_config_store::ServiceConfig;
use tokio::net::TcpListener;

use crate::audit::AccessAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::ServiceNoticeEvent;
use crate::audit::StderrAuditSink;
use crate::handlers::ROUTE_ENV;
use crate::handlers::ROUTE_OEE_CONFIG;
use crate::handlers::get_env;
use crate::handlers::get_oee_config;
use crate::handlers::post_env;
use crate::handlers::post_oee_config;

// ============================================================================
// SECTION: Config Server
// ============================================================================

/// HTTP server instance.
pub struct ConfigServer {
    /// Service configuration.
    config: ServiceConfig,
    /// Shared handler state.
    state: Arc<AppState>,
}

impl ConfigServer {
    /// Builds a server from configuration, choosing the audit sink it names.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or the audit log
    /// cannot be opened.
    pub fn from_config(config: ServiceConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config)?;
        Self::with_audit(config, audit)
    }

    /// Builds a server that reports to the provided audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid.
    pub fn with_audit(
        config: ServiceConfig,
        audit: Arc<dyn AccessAuditSink>,
    ) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let state = Arc::new(AppState {
            env: config.storage.env_store(),
            oee_config: config.storage.oee_config_store(),
            max_body_bytes: config.server.max_body_bytes,
            audit,
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the router serving the document routes.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    /// Binds the configured address and serves requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_listener(listener).await
    }

    /// Serves requests on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the server fails.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(addr) = listener.local_addr() {
            emit_unauthenticated_notice(self.state.audit.as_ref(), addr);
        }
        let app = self.router();
        axum::serve(listener, app)
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Shared handler state.
pub(crate) struct AppState {
    /// Environment document accessor.
    pub(crate) env: EnvStore,
    /// OEE configuration accessor.
    pub(crate) oee_config: OeeConfigStore,
    /// Maximum allowed request body size.
    pub(crate) max_body_bytes: usize,
    /// Access audit sink.
    pub(crate) audit: Arc<dyn AccessAuditSink>,
}

/// Builds the document router.
fn build_router(state: Arc<AppState>) -> Router {
    // Bodies past the limit reach handlers as rejections and are reported there.
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route(ROUTE_ENV, get(get_env).post(post_env))
        .route(ROUTE_OEE_CONFIG, get(get_oee_config).post(post_oee_config))
        .layer(body_limit)
        .with_state(state)
}

/// Builds the audit sink named by configuration.
fn build_audit_sink(config: &ServiceConfig) -> Result<Arc<dyn AccessAuditSink>, ServerError> {
    if !config.audit.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match config.audit.path.as_deref() {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path.trim()))
                .map_err(|err| ServerError::Init(format!("audit log {path}: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Warns when the unauthenticated endpoints are reachable off-host.
fn emit_unauthenticated_notice(audit: &dyn AccessAuditSink, addr: SocketAddr) {
    if !addr.ip().is_loopback() {
        audit.record_notice(&ServiceNoticeEvent::new(
            "unauthenticated_bind",
            format!(
                "serving unauthenticated document endpoints on non-loopback address {addr}; \
                 restrict access at the network layer"
            ),
        ));
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
