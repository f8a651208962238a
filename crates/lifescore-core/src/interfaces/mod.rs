// crates/lifescore-core/src/interfaces/mod.rs
// ============================================================================
// Module: LifeScore Interfaces
// Description: Backend-agnostic persistence interface for user profiles.
// Purpose: Keep the progression calculators free of any storage technology.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The engine depends on storage only through [`ProfileStore`]. Stores must
//! fail closed on corrupted or mismatched data and must implement `save` as
//! a compare-and-swap on the profile version so that concurrent writers in
//! other processes cannot lose updates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::UserId;
use crate::core::records::UserProfile;

// ============================================================================
// SECTION: Profile Store
// ============================================================================

/// Profile store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("profile store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("profile store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("profile store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("profile store invalid data: {0}")]
    Invalid(String),
    /// Stored profile version differs from the version the writer read.
    #[error("profile {user_id} version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Profile owner.
        user_id: String,
        /// Version the writer expected.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
    /// Store reported an error.
    #[error("profile store error: {0}")]
    Store(String),
}

/// Persistence capability for user profiles.
pub trait ProfileStore {
    /// Loads the profile for a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Saves a profile if the stored version equals `expected_version`.
    ///
    /// A missing profile has version zero. `profile.version` must be
    /// `expected_version + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] when another writer committed
    /// first, or another [`StoreError`] when saving fails.
    fn save(&self, profile: &UserProfile, expected_version: u64) -> Result<(), StoreError>;

    /// Deletes every stored version of a user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete(&self, user_id: &UserId) -> Result<(), StoreError>;

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Checks the version pairing shared by every compare-and-swap implementation.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] when `profile.version` does not follow
/// `expected_version`.
pub fn ensure_next_version(profile: &UserProfile, expected_version: u64) -> Result<(), StoreError> {
    if expected_version.checked_add(1) == Some(profile.version) {
        return Ok(());
    }
    Err(StoreError::Invalid(format!(
        "profile version {} does not follow expected version {expected_version}",
        profile.version
    )))
}
