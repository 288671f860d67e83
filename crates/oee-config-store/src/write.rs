// crates/oee-config-store/src/write.rs
// ============================================================================
// Module: Document Writer
// Description: Whole-file replacement with optional temp-file staging.
// Purpose: Replace a document so readers see one complete payload.
// Dependencies: serde, tempfile
// ============================================================================

//! ## Overview
//! Every write replaces the target document entirely. In
//! [`WriteMode::Atomic`] the payload is staged in a uniquely named sibling
//! temp file, synced, and renamed over the target, so concurrent writers
//! never interleave bytes and the last rename wins. [`WriteMode::Direct`]
//! truncates and writes the target in place.
//!
//! Parent directories are never created; a missing directory is an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix for staged temp files next to the target document.
const TEMP_PREFIX: &str = ".oee-write-";

// ============================================================================
// SECTION: Write Mode
// ============================================================================

/// Strategy used to replace a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Stage into a temp file and rename over the target.
    #[default]
    Atomic,
    /// Truncate and write the target in place.
    Direct,
}

impl WriteMode {
    /// Returns the configuration label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Atomic => "atomic",
            Self::Direct => "direct",
        }
    }
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Replaces the document at `path` with `bytes`.
///
/// # Errors
///
/// Returns [`StoreError`] when the target (or its directory) cannot be
/// written.
pub fn write_document(path: &Path, bytes: &[u8], mode: WriteMode) -> Result<(), StoreError> {
    match mode {
        WriteMode::Atomic => write_atomic(path, bytes),
        WriteMode::Direct => fs::write(path, bytes).map_err(|err| StoreError::from_io(path, &err)),
    }
}

/// Stages `bytes` next to `path` and renames the staged file into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|err| StoreError::from_io(dir, &err))?;
    copy_permissions(path, staged.as_file())?;
    staged.write_all(bytes).map_err(|err| StoreError::from_io(staged.path(), &err))?;
    staged.as_file().sync_all().map_err(|err| StoreError::from_io(staged.path(), &err))?;
    staged.persist(path).map_err(|err| StoreError::from_io(path, &err.error))?;
    Ok(())
}

/// Gives `staged` the permissions of the existing document at `path`.
///
/// Temp files start owner-only; a missing target keeps that mode.
fn copy_permissions(path: &Path, staged: &fs::File) -> Result<(), StoreError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(StoreError::from_io(path, &err)),
    };
    staged.set_permissions(meta.permissions()).map_err(|err| StoreError::from_io(path, &err))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
