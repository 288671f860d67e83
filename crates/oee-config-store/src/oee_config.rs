// crates/oee-config-store/src/oee_config.rs
// ============================================================================
// Module: OEE Config Store
// Description: Async accessor for the OEE configuration JSON document.
// Purpose: Pass stored bytes through on read; serialize and replace on write.
// Dependencies: serde_json, tokio
// ============================================================================

//! ## Overview
//! [`OeeConfigStore`] reads the stored document without parsing it and
//! writes any JSON value with two-space indentation, keeping object keys in
//! the order the caller supplied them. No schema is applied
//! and no partial updates are merged: every `set` replaces the file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::StoreError;
use crate::write::WriteMode;
use crate::write::write_document;

// ============================================================================
// SECTION: OEE Config Store
// ============================================================================

/// File-backed OEE configuration accessor.
#[derive(Debug, Clone)]
pub struct OeeConfigStore {
    /// Location of the configuration document.
    path: PathBuf,
    /// Replacement strategy for writes.
    write_mode: WriteMode,
}

impl OeeConfigStore {
    /// Creates an accessor for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, write_mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            write_mode,
        }
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw stored document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the document is missing or unreadable.
    pub async fn get(&self) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(&self.path).await.map_err(|err| StoreError::from_io(&self.path, &err))
    }

    /// Serializes `value` with two-space indentation and replaces the
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when serialization or the write fails.
    pub async fn set(&self, value: &Value) -> Result<(), StoreError> {
        let bytes = render_document(value)?;
        let path = self.path.clone();
        let mode = self.write_mode;
        tokio::task::spawn_blocking(move || write_document(&path, &bytes, mode)).await.map_err(
            |err| StoreError::Io(format!("{}: write task failed: {err}", self.path.display())),
        )?
    }
}

/// Renders a document the way it is stored on disk.
///
/// # Errors
///
/// Returns [`StoreError::Parse`] when the value cannot be serialized.
pub fn render_document(value: &Value) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(value).map_err(|err| StoreError::Parse(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
