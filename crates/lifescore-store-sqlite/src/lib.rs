// crates/lifescore-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Profile Store
// Description: Durable ProfileStore backend using SQLite WAL.
// Purpose: Persist LifeScore user profiles across process restarts.
// Dependencies: lifescore-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`lifescore_core::ProfileStore`] that
//! keeps canonical profile snapshots in a versioned history table. Writers
//! from several processes can share one database file; the per-save version
//! check turns lost races into [`lifescore_core::StoreError::VersionConflict`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_PROFILE_BYTES;
pub use store::SqliteProfileStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
