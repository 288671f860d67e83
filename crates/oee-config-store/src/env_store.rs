// crates/oee-config-store/src/env_store.rs
// ============================================================================
// Module: Env Store
// Description: Accessor for the opaque environment document.
// Purpose: Read and replace the environment file verbatim.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The environment document is an opaque blob. [`EnvStore`] never parses it:
//! `get` returns the bytes on disk and `set` replaces them wholesale. Both
//! operations block the calling thread for the duration of the I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::error::StoreError;
use crate::write::WriteMode;
use crate::write::write_document;

// ============================================================================
// SECTION: Env Store
// ============================================================================

/// File-backed environment document accessor.
#[derive(Debug, Clone)]
pub struct EnvStore {
    /// Location of the environment document.
    path: PathBuf,
    /// Replacement strategy for writes.
    write_mode: WriteMode,
}

impl EnvStore {
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

    /// Reads the whole document unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the document is missing or unreadable.
    pub fn get(&self) -> Result<Vec<u8>, StoreError> {
        fs::read(&self.path).map_err(|err| StoreError::from_io(&self.path, &err))
    }

    /// Reads the document as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] when the content is not UTF-8, or the
    /// errors of [`EnvStore::get`].
    pub fn get_text(&self) -> Result<String, StoreError> {
        let bytes = self.get()?;
        String::from_utf8(bytes).map_err(|err| StoreError::parse_at(&self.path, err))
    }

    /// Replaces the document with `content`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the document cannot be written.
    pub fn set(&self, content: impl AsRef<[u8]>) -> Result<(), StoreError> {
        write_document(&self.path, content.as_ref(), self.write_mode)
    }
}
