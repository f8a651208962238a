// crates/lifescore-core/src/core/hashing.rs
// ============================================================================
// Module: LifeScore Canonical Hashing
// Description: Catalog fingerprints and profile snapshot integrity digests.
// Purpose: Give catalogs and stored profiles one stable, verifiable digest.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! LifeScore hashes two kinds of content, and both go through RFC 8785 (JCS)
//! canonical JSON first so that key order and whitespace never change a
//! digest.
//!
//! ### Catalog fingerprints
//! [`Catalog::fingerprint`](crate::core::Catalog::fingerprint) hashes the
//! whole catalog. Two hosts that load catalog files differing only in
//! formatting report the same fingerprint; any change to a mission reward,
//! skill cost, or reward price yields a different one. `catalog validate`
//! prints it so operators can confirm which catalog an engine runs.
//!
//! ### Snapshot integrity
//! Durable stores persist the canonical bytes of each profile snapshot next
//! to its [`HashDigest`] and the algorithm label. On load the bytes are
//! re-hashed with [`HashDigest::verifies`]; a mismatch means the row was
//! edited outside the store and must be reported as corruption rather than
//! deserialized. The algorithm label is stored per row so a later algorithm
//! can be introduced without rewriting history; unknown labels are rejected
//! by [`HashAlgorithm::parse`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Digest algorithms a stored snapshot or fingerprint may be labeled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 over canonical bytes.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the label persisted alongside a digest.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Parses a persisted algorithm label.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::UnsupportedAlgorithm`] for labels this build does
    /// not know.
    pub fn parse(label: &str) -> Result<Self, HashError> {
        match label {
            "sha256" => Ok(Self::Sha256),
            other => Err(HashError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Algorithm used for new fingerprints and snapshots.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Labeled content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced `value`.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

impl HashDigest {
    /// Wraps raw digest output.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }

    /// Returns true when `bytes` hash to this digest under its own algorithm.
    #[must_use]
    pub fn verifies(&self, bytes: &[u8]) -> bool {
        hash_bytes(self.algorithm, bytes).value == self.value
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Hashing failures.
#[derive(Debug, Error)]
pub enum HashError {
    /// Value could not be rendered as canonical JSON.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
    /// Persisted algorithm label is not recognized.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Renders a value as RFC 8785 canonical JSON.
///
/// These are the bytes stores persist and hash.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Canonicalizes a value and hashes the result.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes bytes that are already canonical.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => HashDigest::new(algorithm, &Sha256::digest(bytes)),
    }
}

/// Lowercase hex encoding.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
