// crates/oee-config-store/src/error.rs
// ============================================================================
// Module: Store Errors
// Description: Unified error type for document accessors.
// Purpose: Give every accessor one failure classification.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every accessor in this crate fails with [`StoreError`]. Filesystem
//! failures are split by [`std::io::ErrorKind`] so callers can distinguish a
//! missing document from a permission problem without inspecting messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Kinds
// ============================================================================

/// Stable classification of store failures.
///
/// # Invariants
/// - Variants are stable for error reporting and log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    /// The document does not exist.
    NotFound,
    /// The process lacks permission to read or write the document.
    PermissionDenied,
    /// The document or payload is not valid JSON (or not valid UTF-8 text).
    ParseError,
    /// Any other I/O failure.
    IoError,
}

impl StoreErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::ParseError => "parse_error",
            Self::IoError => "io_error",
        }
    }
}

// ============================================================================
// SECTION: Store Error
// ============================================================================

/// Errors emitted by document accessors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document was not found.
    #[error("document not found: {0}")]
    NotFound(String),
    /// Access to the document was denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Document content failed to parse.
    #[error("parse error: {0}")]
    Parse(String),
    /// Other I/O failure.
    #[error("io failure: {0}")]
    Io(String),
}

impl StoreError {
    /// Classifies an I/O error raised while accessing `path`.
    #[must_use]
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        let message = format!("{}: {err}", path.display());
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::PermissionDenied => Self::PermissionDenied(message),
            _ => Self::Io(message),
        }
    }

    /// Builds a parse error for content read from `path`.
    #[must_use]
    pub fn parse_at(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Parse(format!("{}: {err}", path.display()))
    }

    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> StoreErrorKind {
        match self {
            Self::NotFound(_) => StoreErrorKind::NotFound,
            Self::PermissionDenied(_) => StoreErrorKind::PermissionDenied,
            Self::Parse(_) => StoreErrorKind::ParseError,
            Self::Io(_) => StoreErrorKind::IoError,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
