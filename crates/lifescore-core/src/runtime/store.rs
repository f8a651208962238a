// crates/lifescore-core/src/runtime/store.rs
// ============================================================================
// Module: LifeScore In-Memory Store
// Description: In-memory profile store and a shared trait-object wrapper.
// Purpose: Provide a deterministic store without external dependencies.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryProfileStore`] keeps profiles in a mutex-protected map and
//! honours the same version compare-and-swap as durable stores. It backs
//! tests and the CLI's `memory` store type. [`SharedProfileStore`] lets hosts
//! choose a backend at runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::UserId;
use crate::core::UserProfile;
use crate::interfaces::ProfileStore;
use crate::interfaces::StoreError;
use crate::interfaces::ensure_next_version;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory profile store for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProfileStore {
    /// Profiles keyed by user id.
    profiles: Arc<Mutex<BTreeMap<UserId, UserProfile>>>,
}

impl InMemoryProfileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let guard = self
            .profiles
            .lock()
            .map_err(|_| StoreError::Store("profile store mutex poisoned".to_string()))?;
        Ok(guard.get(user_id).cloned())
    }

    fn save(&self, profile: &UserProfile, expected_version: u64) -> Result<(), StoreError> {
        ensure_next_version(profile, expected_version)?;
        let mut guard = self
            .profiles
            .lock()
            .map_err(|_| StoreError::Store("profile store mutex poisoned".to_string()))?;
        let actual = guard.get(&profile.user_id).map_or(0, |stored| stored.version);
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                user_id: profile.user_id.to_string(),
                expected: expected_version,
                actual,
            });
        }
        guard.insert(profile.user_id.clone(), profile.clone());
        drop(guard);
        Ok(())
    }

    fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.profiles
            .lock()
            .map_err(|_| StoreError::Store("profile store mutex poisoned".to_string()))?
            .remove(user_id);
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared profile store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedProfileStore {
    /// Inner store implementation.
    inner: Arc<dyn ProfileStore + Send + Sync>,
}

impl SharedProfileStore {
    /// Wraps a profile store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl ProfileStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn ProfileStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl ProfileStore for SharedProfileStore {
    fn load(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        self.inner.load(user_id)
    }

    fn save(&self, profile: &UserProfile, expected_version: u64) -> Result<(), StoreError> {
        self.inner.save(profile, expected_version)
    }

    fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.inner.delete(user_id)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.inner.readiness()
    }
}
