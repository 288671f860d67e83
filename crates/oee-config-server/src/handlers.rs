// crates/oee-config-server/src/handlers.rs
// ============================================================================
// Module: Document Handlers
// Description: axum handlers for the environment and OEE config routes.
// Purpose: Translate HTTP requests into accessor calls and back.
// Dependencies: oee-config-store, axum, serde_json, tokio
// ============================================================================

//! ## Overview
//! Each route has a read handler that returns the stored bytes verbatim and a
//! write handler that replaces the document and acknowledges with a fixed
//! message. Failures are rendered as
//! `{"error":{"kind":"<label>","message":"<text>"}}` with a status derived
//! from [`StoreErrorKind`]. Every request is reported to the audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::CONTENT_LENGTH;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use oee_config_store::StoreError;
use oee_config_store::StoreErrorKind;
use serde::Serialize;
use serde_json::Value;

use crate::audit::AccessAuditEvent;
use crate::audit::AccessAuditEventParams;
use crate::audit::DocumentKind;
use crate::server::AppState;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Route for the environment document.
pub const ROUTE_ENV: &str = "/env";
/// Route for the OEE configuration document.
pub const ROUTE_OEE_CONFIG: &str = "/oee-config";
/// Acknowledgment returned after the environment document is saved.
pub const ENV_SAVED_MESSAGE: &str = ".env saved successfully.";
/// Acknowledgment returned after the OEE configuration is saved.
pub const OEE_CONFIG_SAVED_MESSAGE: &str = "oeeConfig.json saved successfully";
/// Content type for the environment document.
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
/// Content type for JSON payloads.
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `GET /env`.
pub(crate) async fn get_env(State(state): State<Arc<AppState>>) -> Response {
    let meta = RequestMeta::new("GET", ROUTE_ENV, DocumentKind::Env, 0);
    let result = call_blocking(|| state.env.get()).map_err(ApiError::Store).map(|body| Reply {
        content_type: TEXT_CONTENT_TYPE,
        body,
    });
    finish(&state, meta, result)
}

/// Handles `POST /env`.
pub(crate) async fn post_env(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let meta = RequestMeta::new("POST", ROUTE_ENV, DocumentKind::Env, body_size(&headers, &body));
    let result = accept_body(&state, &headers, body)
        .and_then(|body| call_blocking(|| state.env.set(&body)).map_err(ApiError::Store))
        .and_then(|()| acknowledge(ENV_SAVED_MESSAGE));
    finish(&state, meta, result)
}

/// Handles `GET /oee-config`.
pub(crate) async fn get_oee_config(State(state): State<Arc<AppState>>) -> Response {
    let meta = RequestMeta::new("GET", ROUTE_OEE_CONFIG, DocumentKind::OeeConfig, 0);
    let result = state.oee_config.get().await.map_err(ApiError::Store).map(|body| Reply {
        content_type: JSON_CONTENT_TYPE,
        body,
    });
    finish(&state, meta, result)
}

/// Handles `POST /oee-config`.
pub(crate) async fn post_oee_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_bytes = body_size(&headers, &body);
    let meta = RequestMeta::new("POST", ROUTE_OEE_CONFIG, DocumentKind::OeeConfig, request_bytes);
    let parsed = accept_body(&state, &headers, body).and_then(|body| parse_json_body(&body));
    let result = match parsed {
        Ok(value) => match state.oee_config.set(&value).await {
            Ok(()) => acknowledge(OEE_CONFIG_SAVED_MESSAGE),
            Err(err) => Err(ApiError::Store(err)),
        },
        Err(err) => Err(err),
    };
    finish(&state, meta, result)
}

// ============================================================================
// SECTION: Request Plumbing
// ============================================================================

/// Request attributes reported to the audit sink.
struct RequestMeta {
    /// HTTP method.
    method: &'static str,
    /// Matched route.
    route: &'static str,
    /// Document addressed.
    document: DocumentKind,
    /// Request body size in bytes.
    request_bytes: usize,
}

impl RequestMeta {
    /// Creates request metadata.
    const fn new(
        method: &'static str,
        route: &'static str,
        document: DocumentKind,
        request_bytes: usize,
    ) -> Self {
        Self {
            method,
            route,
            document,
            request_bytes,
        }
    }
}

/// Successful response body.
struct Reply {
    /// Response content type.
    content_type: &'static str,
    /// Response bytes.
    body: Vec<u8>,
}

/// Failures surfaced by handlers.
#[derive(Debug)]
pub(crate) enum ApiError {
    /// Accessor or body parsing failure.
    Store(StoreError),
    /// Request body exceeded the configured limit.
    PayloadTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Body size in bytes, when known.
        actual_bytes: Option<usize>,
    },
    /// Request body could not be read.
    BadBody(String),
}

impl ApiError {
    /// Returns the status and stable kind label for the error.
    pub(crate) const fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Store(err) => {
                let kind = err.kind();
                let status = match kind {
                    StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
                    StoreErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                    StoreErrorKind::ParseError => StatusCode::BAD_REQUEST,
                    StoreErrorKind::IoError => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, kind.as_str())
            }
            Self::PayloadTooLarge {
                ..
            } => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            Self::BadBody(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }

    /// Returns the human-readable message for the error.
    fn message(&self) -> String {
        match self {
            Self::Store(err) => err.to_string(),
            Self::PayloadTooLarge {
                max_bytes,
                actual_bytes: Some(actual_bytes),
            } => format!("request body exceeds size limit: {actual_bytes} bytes (max {max_bytes})"),
            Self::PayloadTooLarge {
                max_bytes,
                actual_bytes: None,
            } => format!("request body exceeds size limit (max {max_bytes} bytes)"),
            Self::BadBody(message) => format!("failed to read request body: {message}"),
        }
    }
}

/// Error envelope returned to callers.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    /// Error details.
    error: ErrorBody,
}

/// Error details within the envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable kind label.
    kind: &'static str,
    /// Human-readable message.
    message: String,
}

/// Acknowledgment body for successful writes.
#[derive(Debug, Serialize)]
struct SavedMessage {
    /// Acknowledgment text.
    message: &'static str,
}

/// Builds the acknowledgment reply for a successful write.
fn acknowledge(message: &'static str) -> Result<Reply, ApiError> {
    let body = serde_json::to_vec(&SavedMessage {
        message,
    })
    .map_err(|err| ApiError::Store(StoreError::Io(err.to_string())))?;
    Ok(Reply {
        content_type: JSON_CONTENT_TYPE,
        body,
    })
}

/// Unwraps the extracted body, rejecting bodies over the configured limit.
///
/// The router's body limit stops buffering early, so large bodies arrive
/// here as a rejection rather than as bytes.
fn accept_body(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Bytes, ApiError> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::PayloadTooLarge {
                max_bytes: state.max_body_bytes,
                actual_bytes: declared_length(headers),
            });
        }
        Err(rejection) => return Err(ApiError::BadBody(rejection.body_text())),
    };
    if body.len() > state.max_body_bytes {
        return Err(ApiError::PayloadTooLarge {
            max_bytes: state.max_body_bytes,
            actual_bytes: Some(body.len()),
        });
    }
    Ok(body)
}

/// Returns the body size reported to the audit sink.
fn body_size(headers: &HeaderMap, body: &Result<Bytes, BytesRejection>) -> usize {
    match body {
        Ok(body) => body.len(),
        Err(_) => declared_length(headers).unwrap_or(0),
    }
}

/// Parses the `Content-Length` header.
fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

/// Parses a request body as JSON.
fn parse_json_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::Store(StoreError::Parse(format!("request body: {err}"))))
}

/// Renders the response and records the audit event.
fn finish(state: &AppState, meta: RequestMeta, result: Result<Reply, ApiError>) -> Response {
    let (status, content_type, body, error_kind) = match result {
        Ok(reply) => (StatusCode::OK, reply.content_type, reply.body, None),
        Err(err) => {
            let (status, kind) = err.classify();
            let envelope = ErrorEnvelope {
                error: ErrorBody {
                    kind,
                    message: err.message(),
                },
            };
            let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| {
                br#"{"error":{"kind":"io_error","message":"serialization failed"}}"#.to_vec()
            });
            (status, JSON_CONTENT_TYPE, body, Some(kind))
        }
    };
    state.audit.record(&AccessAuditEvent::new(AccessAuditEventParams {
        method: meta.method,
        route: meta.route,
        document: meta.document,
        status: status.as_u16(),
        error_kind,
        request_bytes: meta.request_bytes,
        response_bytes: body.len(),
    }));
    (status, [(CONTENT_TYPE, content_type)], body).into_response()
}

/// Executes blocking document I/O, shifting to a blocking context when
/// available.
fn call_blocking<T>(operation: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(operation)
        }
        _ => operation(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use axum::http::HeaderMap;
    use axum::http::HeaderValue;
    use axum::http::StatusCode;
    use axum::http::header::CONTENT_LENGTH;
    use oee_config_store::StoreError;

    use super::ApiError;
    use super::declared_length;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::NotFound("x".to_string()), StatusCode::NOT_FOUND, "not_found"),
            (
                StoreError::PermissionDenied("x".to_string()),
                StatusCode::FORBIDDEN,
                "permission_denied",
            ),
            (StoreError::Parse("x".to_string()), StatusCode::BAD_REQUEST, "parse_error"),
            (StoreError::Io("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        ];
        for (err, status, kind) in cases {
            assert_eq!(ApiError::Store(err).classify(), (status, kind));
        }
    }

    #[test]
    fn oversized_body_maps_to_413() {
        let err = ApiError::PayloadTooLarge {
            max_bytes: 4,
            actual_bytes: Some(5),
        };
        assert_eq!(err.classify(), (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"));
        assert!(err.message().contains("5 bytes (max 4)"));

        let r#unsized = ApiError::PayloadTooLarge {
            max_bytes: 4,
            actual_bytes: None,
        };
        assert!(r#unsized.message().contains("max 4 bytes"));
    }

    #[test]
    fn declared_length_reads_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1000"));
        assert_eq!(declared_length(&headers), Some(1000));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert_eq!(declared_length(&headers), None);
    }
}
