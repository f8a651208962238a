// crates/lifescore-cli/src/host.rs
// ============================================================================
// Module: LifeScore Engine Host
// Description: Builds the progression engine from a loaded configuration.
// Purpose: Select the profile store and audit sink named by `lifescore.toml`.
// Dependencies: lifescore-config, lifescore-core, lifescore-store-sqlite, thiserror
// ============================================================================

//! ## Overview
//! The host resolves the three pluggable pieces of an engine: the catalog
//! file, the profile store (`memory` or `sqlite`), and the audit sink
//! (`none`, `stderr`, or `file`). Every store is wrapped in a
//! [`SharedProfileStore`] so the engine type is the same for all backends.
//! The assembled engine must pass a store readiness check before any
//! command runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use lifescore_config::AuditConfig;
use lifescore_config::AuditSinkType;
use lifescore_config::CatalogLoadError;
use lifescore_config::LifeScoreConfig;
use lifescore_config::ProfileStoreConfig;
use lifescore_config::ProfileStoreType;
use lifescore_config::load_catalog;
use lifescore_core::AuditSink;
use lifescore_core::EngineError;
use lifescore_core::FileAuditSink;
use lifescore_core::InMemoryProfileStore;
use lifescore_core::NoopAuditSink;
use lifescore_core::ProgressionEngine;
use lifescore_core::SharedProfileStore;
use lifescore_core::StderrAuditSink;
use lifescore_store_sqlite::SqliteProfileStore;
use lifescore_store_sqlite::SqliteStoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Engine type used by the CLI for every store backend.
pub type HostedEngine = ProgressionEngine<SharedProfileStore>;

/// Errors raised while assembling the engine.
#[derive(Debug, Error)]
pub enum HostError {
    /// Catalog file could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),
    /// SQLite store could not be opened.
    #[error(transparent)]
    Store(#[from] SqliteStoreError),
    /// Audit log could not be opened.
    #[error("failed to open audit log: {0}")]
    Audit(String),
    /// Configuration is missing a value the backend needs.
    #[error("invalid config: {0}")]
    Config(String),
    /// Engine rejected the catalog.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Builds the engine described by the configuration.
///
/// # Errors
///
/// Returns [`HostError`] when the catalog, store, or audit sink cannot be
/// opened, or when the store fails its readiness check.
pub fn build_engine(config: &LifeScoreConfig) -> Result<HostedEngine, HostError> {
    let catalog = load_catalog(&config.catalog.path)?;
    let store = open_store(&config.store)?;
    let audit = open_audit_sink(&config.audit)?;
    let engine = ProgressionEngine::new(catalog, store, audit, config.engine.engine_config())?;
    engine.readiness()?;
    Ok(engine)
}

/// Opens the configured profile store.
///
/// # Errors
///
/// Returns [`HostError`] when the sqlite store cannot be opened.
pub fn open_store(config: &ProfileStoreConfig) -> Result<SharedProfileStore, HostError> {
    match config.store_type {
        ProfileStoreType::Memory => Ok(SharedProfileStore::from_store(InMemoryProfileStore::new())),
        ProfileStoreType::Sqlite => {
            let sqlite_config = config
                .sqlite_config()
                .ok_or_else(|| HostError::Config("sqlite store requires path".to_string()))?;
            Ok(SharedProfileStore::from_store(SqliteProfileStore::new(sqlite_config)?))
        }
    }
}

/// Opens the configured audit sink.
///
/// # Errors
///
/// Returns [`HostError`] when the audit file cannot be opened.
pub fn open_audit_sink(config: &AuditConfig) -> Result<Arc<dyn AuditSink>, HostError> {
    match config.sink {
        AuditSinkType::None => Ok(Arc::new(NoopAuditSink)),
        AuditSinkType::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkType::File => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| HostError::Config("file audit sink requires path".to_string()))?;
            let sink = FileAuditSink::new(path).map_err(|err| HostError::Audit(err.to_string()))?;
            Ok(Arc::new(sink))
        }
    }
}
