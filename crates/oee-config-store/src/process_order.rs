// crates/oee-config-store/src/process_order.rs
// ============================================================================
// Module: Process Order Loader
// Description: Loads JSON process-order definitions from disk.
// Purpose: Resolve a caller-supplied path and parse its JSON content.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Process orders are JSON documents consumed by an MQTT-driven workflow
//! outside this crate. [`ProcessOrderLoader`] resolves the requested path to
//! an absolute path, reads it, and parses it. Nothing is cached; every call
//! re-reads the file. The parsed value is returned untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Loader for process-order documents.
#[derive(Debug, Clone, Default)]
pub struct ProcessOrderLoader {
    /// Base directory for relative paths; the working directory when unset.
    base_dir: Option<PathBuf>,
}

impl ProcessOrderLoader {
    /// Creates a loader that resolves relative paths against the working
    /// directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_dir: None,
        }
    }

    /// Creates a loader that resolves relative paths against `base_dir`.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Resolves `path` to an absolute filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the working directory cannot be
    /// determined.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
        let path = path.as_ref();
        let joined = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        };
        std::path::absolute(&joined).map_err(|err| StoreError::from_io(&joined, &err))
    }

    /// Loads and parses the process order at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be read or is not valid
    /// JSON.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Value, StoreError> {
        self.load_as(path)
    }

    /// Loads the process order at `path` into a caller-defined type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be read or does not
    /// deserialize into `T`.
    pub fn load_as<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<T, StoreError> {
        let resolved = self.resolve(path)?;
        let bytes = fs::read(&resolved).map_err(|err| StoreError::from_io(&resolved, &err))?;
        let text = std::str::from_utf8(&bytes).map_err(|err| StoreError::parse_at(&resolved, err))?;
        serde_json::from_str(text).map_err(|err| StoreError::parse_at(&resolved, err))
    }
}
