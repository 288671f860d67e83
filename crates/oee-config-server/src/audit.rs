// crates/oee-config-server/src/audit.rs
// ============================================================================
// Module: Access Audit Logging
// Description: Structured access events for document requests.
// Purpose: Emit one JSON line per request without logging payload content.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every handled request produces an [`AccessAuditEvent`] routed to an
//! [`AccessAuditSink`]. Events carry sizes and outcome labels only; document
//! content never reaches the log. Sinks write JSON lines to stderr, to an
//! append-only file, or nowhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Document addressed by a request.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// The environment document.
    Env,
    /// The OEE configuration document.
    OeeConfig,
}

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    /// Successful request.
    Ok,
    /// Failed request.
    Error,
}

/// Access audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AccessAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: &'static str,
    /// Matched route.
    pub route: &'static str,
    /// Document addressed by the request.
    pub document: DocumentKind,
    /// Request outcome.
    pub outcome: AccessOutcome,
    /// HTTP status code returned.
    pub status: u16,
    /// Error kind label when the request failed.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Inputs required to construct an access audit event.
pub struct AccessAuditEventParams {
    /// HTTP method.
    pub method: &'static str,
    /// Matched route.
    pub route: &'static str,
    /// Document addressed by the request.
    pub document: DocumentKind,
    /// HTTP status code returned.
    pub status: u16,
    /// Error kind label when the request failed.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl AccessAuditEvent {
    /// Creates a new access event stamped with the current time.
    #[must_use]
    pub fn new(params: AccessAuditEventParams) -> Self {
        let outcome =
            if params.error_kind.is_some() { AccessOutcome::Error } else { AccessOutcome::Ok };
        Self {
            event: "config_access",
            timestamp_ms: now_ms(),
            method: params.method,
            route: params.route,
            document: params.document,
            outcome,
            status: params.status,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

/// Service lifecycle notice (startup posture warnings).
#[derive(Debug, Clone, Serialize)]
pub struct ServiceNoticeEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Notice kind label.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ServiceNoticeEvent {
    /// Creates a new notice stamped with the current time.
    #[must_use]
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            event: "service_notice",
            timestamp_ms: now_ms(),
            kind,
            message: message.into(),
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for document access events.
pub trait AccessAuditSink: Send + Sync {
    /// Record an access event.
    fn record(&self, event: &AccessAuditEvent);

    /// Record a service notice.
    fn record_notice(&self, _event: &ServiceNoticeEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AccessAuditSink for StderrAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_notice(&self, event: &ServiceNoticeEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized line.
    fn append(&self, payload: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AccessAuditSink for FileAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }

    fn record_notice(&self, event: &ServiceNoticeEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AccessAuditSink for NoopAuditSink {
    fn record(&self, _event: &AccessAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
