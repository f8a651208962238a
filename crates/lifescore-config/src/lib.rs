// crates/lifescore-config/src/lib.rs
// ============================================================================
// Module: LifeScore Config Library
// Description: Canonical config model, validation, and catalog loading.
// Purpose: Single source of truth for lifescore.toml semantics.
// Dependencies: lifescore-core, lifescore-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `lifescore-config` defines the configuration model for LifeScore hosts.
//! Validation is strict and fails closed; the catalog file named by the
//! config is parsed and validated before any engine is built from it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CatalogLoadError;
pub use catalog::MAX_CATALOG_FILE_SIZE;
pub use catalog::load_catalog;
pub use config::*;
