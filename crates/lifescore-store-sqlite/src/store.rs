// crates/lifescore-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Profile Store
// Description: Durable ProfileStore backed by SQLite WAL.
// Purpose: Persist profile snapshots with integrity hashes and version checks.
// Dependencies: lifescore-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each save writes a canonical JSON snapshot into an append-only version
//! table and advances the user's `latest_version` pointer in the same
//! transaction. The save only proceeds when the stored pointer equals the
//! version the writer read, so concurrent writers cannot lose updates.
//! Loads verify the stored hash, the owning user, and the embedded version,
//! and fail closed on any mismatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use lifescore_core::HashAlgorithm;
use lifescore_core::HashDigest;
use lifescore_core::ProfileStore;
use lifescore_core::StoreError;
use lifescore_core::UserId;
use lifescore_core::UserProfile;
use lifescore_core::hashing::DEFAULT_HASH_ALGORITHM;
use lifescore_core::hashing::canonical_json_bytes;
use lifescore_core::hashing::hash_bytes;
use lifescore_core::interfaces::ensure_next_version;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum profile snapshot size accepted by the store.
pub const MAX_PROFILE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` profile store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional maximum snapshots kept per user (older versions pruned).
    #[serde(default)]
    pub max_versions: Option<u64>,
}

impl SqliteStoreConfig {
    /// Builds a configuration with default tuning for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_versions: None,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Stored profile version differs from the writer's expected version.
    #[error("sqlite store version conflict for {user_id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Profile owner.
        user_id: String,
        /// Version the writer expected.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::VersionConflict {
                user_id,
                expected,
                actual,
            } => Self::VersionConflict {
                user_id,
                expected,
                actual,
            },
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "profile_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps a `SQLite` engine error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err callback.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed profile store with WAL support.
#[derive(Clone)]
pub struct SqliteProfileStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteProfileStore {
    /// Opens an `SQLite`-backed profile store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when `max_versions` is zero.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        if config.max_versions == Some(0) {
            return Err(SqliteStoreError::Invalid(
                "max_versions must be greater than zero".to_string(),
            ));
        }
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

impl ProfileStore for SqliteProfileStore {
    fn load(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        self.load_profile(user_id).map_err(StoreError::from)
    }

    fn save(&self, profile: &UserProfile, expected_version: u64) -> Result<(), StoreError> {
        self.save_profile(profile, expected_version).map_err(StoreError::from)
    }

    fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.delete_profile(user_id).map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| StoreError::Store("mutex poisoned".to_string()))?;
        guard
            .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|err| StoreError::Store(err.to_string()))?;
        Ok(())
    }
}

impl SqliteProfileStore {
    /// Loads the latest profile snapshot for a user.
    fn load_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, SqliteStoreError> {
        let row = {
            let mut guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let tx = guard.transaction().map_err(db_error)?;
            let Some(latest_version) = latest_version(&tx, user_id.as_str())? else {
                return Ok(None);
            };
            let metadata = tx
                .query_row(
                    "SELECT length(profile_json), profile_hash, hash_algorithm FROM \
                     profile_versions WHERE user_id = ?1 AND version = ?2",
                    params![user_id.as_str(), to_db_version(latest_version)?],
                    |row| {
                        let length: i64 = row.get(0)?;
                        let hash: String = row.get(1)?;
                        let algorithm: String = row.get(2)?;
                        Ok((length, hash, algorithm))
                    },
                )
                .optional()
                .map_err(db_error)?;
            let Some((length, hash, algorithm)) = metadata else {
                return Err(SqliteStoreError::Corrupt(format!(
                    "missing profile version {latest_version} for user {user_id}"
                )));
            };
            let length = usize::try_from(length).map_err(|_| {
                SqliteStoreError::Invalid(format!("negative profile length for user {user_id}"))
            })?;
            if length > MAX_PROFILE_BYTES {
                return Err(SqliteStoreError::TooLarge {
                    max_bytes: MAX_PROFILE_BYTES,
                    actual_bytes: length,
                });
            }
            let bytes: Vec<u8> = tx
                .query_row(
                    "SELECT profile_json FROM profile_versions WHERE user_id = ?1 AND version = ?2",
                    params![user_id.as_str(), to_db_version(latest_version)?],
                    |row| row.get(0),
                )
                .map_err(db_error)?;
            tx.commit().map_err(db_error)?;
            drop(guard);
            (latest_version, bytes, hash, algorithm)
        };
        let (latest_version, bytes, hash_value, hash_algorithm) = row;
        let stored = HashDigest {
            algorithm: HashAlgorithm::parse(&hash_algorithm)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?,
            value: hash_value,
        };
        if !stored.verifies(&bytes) {
            return Err(SqliteStoreError::Corrupt(format!("hash mismatch for user {user_id}")));
        }
        let profile: UserProfile =
            serde_json::from_slice(&bytes).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if profile.user_id != *user_id {
            return Err(SqliteStoreError::Invalid(
                "user_id mismatch between key and payload".to_string(),
            ));
        }
        if profile.version != latest_version {
            return Err(SqliteStoreError::Corrupt(format!(
                "profile version {} does not match stored version {latest_version} for user \
                 {user_id}",
                profile.version
            )));
        }
        Ok(Some(profile))
    }

    /// Saves a profile snapshot if the stored version equals `expected_version`.
    fn save_profile(
        &self,
        profile: &UserProfile,
        expected_version: u64,
    ) -> Result<(), SqliteStoreError> {
        ensure_next_version(profile, expected_version)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let canonical_json =
            canonical_json_bytes(profile).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if canonical_json.len() > MAX_PROFILE_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_PROFILE_BYTES,
                actual_bytes: canonical_json.len(),
            });
        }
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &canonical_json);
        let user_id = profile.user_id.as_str();
        let next_version = to_db_version(profile.version)?;
        let saved_at = unix_millis();
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate).map_err(db_error)?;
        let actual = latest_version(&tx, user_id)?.unwrap_or(0);
        if actual != expected_version {
            return Err(SqliteStoreError::VersionConflict {
                user_id: user_id.to_string(),
                expected: expected_version,
                actual,
            });
        }
        tx.execute(
            "INSERT INTO profiles (user_id, latest_version) VALUES (?1, ?2) ON CONFLICT(user_id) \
             DO UPDATE SET latest_version = excluded.latest_version",
            params![user_id, next_version],
        )
        .map_err(db_error)?;
        tx.execute(
            "INSERT INTO profile_versions (user_id, version, profile_json, profile_hash, \
             hash_algorithm, saved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                next_version,
                canonical_json,
                digest.value,
                digest.algorithm.as_str(),
                saved_at
            ],
        )
        .map_err(db_error)?;
        enforce_retention(&tx, user_id, next_version, self.config.max_versions)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    /// Removes a user's pointer row; snapshots cascade.
    fn delete_profile(&self, user_id: &UserId) -> Result<(), SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        guard
            .execute("DELETE FROM profiles WHERE user_id = ?1", params![user_id.as_str()])
            .map_err(db_error)?;
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the latest committed version for a user.
fn latest_version(tx: &Transaction<'_>, user_id: &str) -> Result<Option<u64>, SqliteStoreError> {
    let value: Option<i64> = tx
        .query_row(
            "SELECT latest_version FROM profiles WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_error)?;
    match value {
        None => Ok(None),
        Some(value) if value < 1 => Err(SqliteStoreError::Corrupt(format!(
            "invalid latest_version for user {user_id}"
        ))),
        Some(value) => from_db_version(value, user_id).map(Some),
    }
}

/// Converts a profile version into a `SQLite` integer.
fn to_db_version(version: u64) -> Result<i64, SqliteStoreError> {
    i64::try_from(version)
        .map_err(|_| SqliteStoreError::Invalid(format!("profile version {version} too large")))
}

/// Converts a stored `SQLite` integer into a profile version.
fn from_db_version(value: i64, user_id: &str) -> Result<u64, SqliteStoreError> {
    u64::try_from(value)
        .map_err(|_| SqliteStoreError::Corrupt(format!("negative version for user {user_id}")))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durability pragmas applied.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS profiles (
                    user_id TEXT PRIMARY KEY,
                    latest_version INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS profile_versions (
                    user_id TEXT NOT NULL,
                    version INTEGER NOT NULL,
                    profile_json BLOB NOT NULL,
                    profile_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    saved_at INTEGER NOT NULL,
                    PRIMARY KEY (user_id, version),
                    FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

/// Prunes snapshots older than the retention window.
fn enforce_retention(
    tx: &Transaction<'_>,
    user_id: &str,
    latest_version: i64,
    max_versions: Option<u64>,
) -> Result<(), SqliteStoreError> {
    let Some(max_versions) = max_versions else {
        return Ok(());
    };
    let max_versions = i64::try_from(max_versions)
        .map_err(|_| SqliteStoreError::Invalid("max_versions too large".to_string()))?;
    if latest_version > max_versions {
        tx.execute(
            "DELETE FROM profile_versions WHERE user_id = ?1 AND version <= ?2",
            params![user_id, latest_version - max_versions],
        )
        .map_err(db_error)?;
    }
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
