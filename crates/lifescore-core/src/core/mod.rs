// crates/lifescore-core/src/core/mod.rs
// ============================================================================
// Module: LifeScore Core Types
// Description: Canonical progression, catalog, and user record structures.
// Purpose: Provide stable, serializable types shared by every engine component.
// Dependencies: serde, serde_jcs, sha2, time
// ============================================================================

//! ## Overview
//! Core types define the per-user progression record, the immutable mission,
//! skill-tree, and reward catalogs, and the mutable user records that the
//! runtime components produce. These types are the canonical source of truth
//! for any derived surface (CLI, storage snapshots, transport payloads).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod hashing;
pub mod identifiers;
pub mod progression;
pub mod records;
pub mod timestamp;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::BadgeRarity;
pub use catalog::Catalog;
pub use catalog::CatalogError;
pub use catalog::Difficulty;
pub use catalog::Mission;
pub use catalog::MissionCategory;
pub use catalog::MissionRequirements;
pub use catalog::Reward;
pub use catalog::RewardType;
pub use catalog::SkillBonus;
pub use catalog::SkillNode;
pub use catalog::SkillRequirements;
pub use catalog::SkillTree;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::MissionId;
pub use identifiers::RewardId;
pub use identifiers::SkillNodeId;
pub use identifiers::SkillTreeId;
pub use identifiers::UserId;
pub use progression::LIFESCORE_MAX;
pub use progression::LIFESCORE_MIN;
pub use progression::ProgressionDelta;
pub use progression::ProgressionError;
pub use progression::ProgressionState;
pub use progression::XP_PER_LEVEL;
pub use progression::XpApplied;
pub use progression::level_for_xp;
pub use records::MissionStatus;
pub use records::RewardAcquisition;
pub use records::UserMission;
pub use records::UserProfile;
pub use records::UserReward;
pub use records::UserSkill;
pub use timestamp::Timestamp;
