// crates/lifescore-config/src/catalog.rs
// ============================================================================
// Module: Catalog Loader
// Description: Reads and validates JSON catalog files.
// Purpose: Hand the engine only catalogs that passed load-time validation.
// Dependencies: lifescore-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A catalog file is a JSON object with `missions`, `skill_trees`, and
//! `rewards` arrays. Files over [`MAX_CATALOG_FILE_SIZE`] are rejected before
//! parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use lifescore_core::Catalog;
use lifescore_core::CatalogError;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum catalog file size in bytes.
pub const MAX_CATALOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// I/O failure while reading the catalog.
    #[error("catalog io error: {0}")]
    Io(String),
    /// Catalog file exceeds the size limit.
    #[error("catalog file exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: u64,
        /// Actual file size in bytes.
        actual_bytes: u64,
    },
    /// JSON parsing error.
    #[error("catalog parse error: {0}")]
    Parse(String),
    /// Catalog failed validation.
    #[error("invalid catalog: {0}")]
    Invalid(#[from] CatalogError),
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Reads, parses, and validates a JSON catalog file.
///
/// # Errors
///
/// Returns [`CatalogLoadError`] when the file cannot be read, is too large,
/// is not a valid catalog document, or violates catalog invariants.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let metadata = fs::metadata(path).map_err(|err| CatalogLoadError::Io(err.to_string()))?;
    if metadata.len() > MAX_CATALOG_FILE_SIZE {
        return Err(CatalogLoadError::TooLarge {
            max_bytes: MAX_CATALOG_FILE_SIZE,
            actual_bytes: metadata.len(),
        });
    }
    let bytes = fs::read(path).map_err(|err| CatalogLoadError::Io(err.to_string()))?;
    let catalog: Catalog =
        serde_json::from_slice(&bytes).map_err(|err| CatalogLoadError::Parse(err.to_string()))?;
    catalog.validate()?;
    Ok(catalog)
}
