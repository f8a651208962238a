// crates/lifescore-core/src/core/records.rs
// ============================================================================
// Module: LifeScore User Records
// Description: Mutable per-user mission, skill, and reward records.
// Purpose: Define the persisted profile aggregate keyed by user identifier.
// Dependencies: crate::core::{identifiers, progression, timestamp}, serde, time
// ============================================================================

//! ## Overview
//! A [`UserProfile`] bundles everything the engine persists for one user:
//! the progression record, mission instances keyed by mission id, skill
//! records keyed by (tree id, node id), and the append-only reward ledger.
//! `version` increases by exactly one per committed command and backs the
//! store's compare-and-swap.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use time::Date;

use crate::core::identifiers::MissionId;
use crate::core::identifiers::RewardId;
use crate::core::identifiers::SkillNodeId;
use crate::core::identifiers::SkillTreeId;
use crate::core::identifiers::UserId;
use crate::core::progression::ProgressionState;
use crate::core::timestamp::Timestamp;

// ============================================================================
// SECTION: Missions
// ============================================================================

/// Stored mission status. Availability is the absence of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Mission is in progress.
    Active,
    /// Mission is finished; the record is immutable.
    Completed,
}

/// Per-user mission instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMission {
    /// Catalog mission identifier.
    pub mission_id: MissionId,
    /// Lifecycle status.
    pub status: MissionStatus,
    /// Progress percentage in `[0, 100]`.
    pub progress: u8,
    /// Start timestamp.
    pub started_at: Timestamp,
    /// Last mutation timestamp.
    pub updated_at: Timestamp,
    /// Completion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// XP frozen at completion (zero while active).
    pub xp_earned: u64,
    /// LifeScore impact frozen at completion (zero while active).
    pub lifescore_change: i64,
    /// Coins frozen at completion (zero while active).
    pub coins_earned: u64,
}

impl UserMission {
    /// Returns true when the mission is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, MissionStatus::Active)
    }

    /// Returns true when the mission is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, MissionStatus::Completed)
    }
}

// ============================================================================
// SECTION: Skills
// ============================================================================

/// Per-user skill node record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSkill {
    /// Owning tree.
    pub tree_id: SkillTreeId,
    /// Node identifier.
    pub node_id: SkillNodeId,
    /// Whether the node is unlocked.
    pub unlocked: bool,
    /// Progress percentage in `[0, 100]`.
    pub progress: u8,
    /// Unlock timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<Timestamp>,
}

// ============================================================================
// SECTION: Rewards
// ============================================================================

/// How a reward entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardAcquisition {
    /// Granted without payment.
    Earned,
    /// Bought with coins.
    Purchased,
}

/// Reward ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReward {
    /// Catalog reward identifier.
    pub reward_id: RewardId,
    /// Acquisition kind.
    pub acquisition: RewardAcquisition,
    /// Coins deducted (zero when earned).
    pub coins_spent: u64,
    /// Free-form context tag.
    pub context: String,
    /// Acquisition timestamp.
    pub acquired_at: Timestamp,
}

// ============================================================================
// SECTION: Profile
// ============================================================================

/// Persisted per-user aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning user.
    pub user_id: UserId,
    /// Commit counter; zero for a profile that was never saved.
    pub version: u64,
    /// Progression record.
    pub progression: ProgressionState,
    /// Mission instances keyed by mission id.
    #[serde(default)]
    pub missions: BTreeMap<MissionId, UserMission>,
    /// Skill records.
    #[serde(default)]
    pub skills: Vec<UserSkill>,
    /// Append-only reward ledger.
    #[serde(default)]
    pub rewards: Vec<UserReward>,
    /// Calendar day of the most recent check-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_in: Option<Date>,
}

impl UserProfile {
    /// Creates an empty, never-saved profile.
    #[must_use]
    pub const fn new(user_id: UserId, progression: ProgressionState) -> Self {
        Self {
            user_id,
            version: 0,
            progression,
            missions: BTreeMap::new(),
            skills: Vec::new(),
            rewards: Vec::new(),
            last_check_in: None,
        }
    }

    /// Returns the mission instance for the given id.
    #[must_use]
    pub fn mission(&self, mission_id: &MissionId) -> Option<&UserMission> {
        self.missions.get(mission_id)
    }

    /// Returns the identifiers of completed missions.
    #[must_use]
    pub fn completed_mission_ids(&self) -> BTreeSet<&MissionId> {
        self.missions.values().filter(|mission| mission.is_completed()).map(|m| &m.mission_id).collect()
    }

    /// Returns the skill record for a (tree, node) pair.
    #[must_use]
    pub fn skill(&self, tree_id: &SkillTreeId, node_id: &SkillNodeId) -> Option<&UserSkill> {
        self.skills.iter().find(|skill| &skill.tree_id == tree_id && &skill.node_id == node_id)
    }

    /// Returns the identifiers of unlocked skill nodes across all trees.
    #[must_use]
    pub fn unlocked_skill_ids(&self) -> BTreeSet<&SkillNodeId> {
        self.skills.iter().filter(|skill| skill.unlocked).map(|skill| &skill.node_id).collect()
    }

    /// Returns true when the reward is already in the ledger.
    #[must_use]
    pub fn owns_reward(&self, reward_id: &RewardId) -> bool {
        self.rewards.iter().any(|reward| &reward.reward_id == reward_id)
    }
}
