// crates/lifescore-core/src/runtime/engine.rs
// ============================================================================
// Module: LifeScore Progression Engine
// Description: Per-user command execution over the progression components.
// Purpose: Serialize, persist, and audit every progression command.
// Dependencies: crate::{core, interfaces, runtime}, serde, thiserror, time
// ============================================================================

//! ## Overview
//! The progression engine is the single canonical command path for LifeScore.
//! Every transport (CLI, HTTP handlers, SDKs) must call into these methods.
//!
//! Each command runs inside a per-user critical section: load the profile
//! (or initialize one), run the pure component operation on a working copy,
//! save it with a compare-and-swap on the version read, then emit one audit
//! event. A rejected command saves nothing. The compare-and-swap also guards
//! against writers in other processes sharing the same store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::core::Catalog;
use crate::core::CatalogError;
use crate::core::Mission;
use crate::core::MissionId;
use crate::core::ProgressionDelta;
use crate::core::ProgressionState;
use crate::core::RewardId;
use crate::core::SkillNodeId;
use crate::core::SkillTreeId;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::core::UserMission;
use crate::core::UserProfile;
use crate::core::UserReward;
use crate::interfaces::ProfileStore;
use crate::interfaces::StoreError;
use crate::runtime::audit::AuditSink;
use crate::runtime::audit::ProgressionAuditEvent;
use crate::runtime::missions;
use crate::runtime::missions::MissionCompletion;
use crate::runtime::missions::MissionError;
use crate::runtime::missions::ProgressUpdate;
use crate::runtime::rewards;
use crate::runtime::rewards::RewardError;
use crate::runtime::rewards::RewardGrant;
use crate::runtime::skills;
use crate::runtime::skills::SkillError;
use crate::runtime::skills::SkillNodeStatus;
use crate::runtime::skills::SkillUnlock;

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Configuration for the progression engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// LifeScore seeded into new and reset profiles.
    pub starting_lifescore: u32,
}

// ============================================================================
// SECTION: Command Results
// ============================================================================

/// Result envelope returned by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReceipt<T> {
    /// User the command applied to.
    pub user_id: UserId,
    /// Profile version after the command.
    pub profile_version: u64,
    /// Progression record after the command.
    pub progression: ProgressionState,
    /// Command-specific result.
    pub result: T,
}

/// Streak effect of a daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    /// First check-in on record; streak incremented.
    Started,
    /// Check-in on the day after the previous one; streak incremented.
    Continued,
    /// At least one day was missed; streak decayed.
    Decayed,
    /// Repeat check-in on the same day; nothing changed.
    AlreadyCheckedIn,
}

/// Result of a daily check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIn {
    /// Calendar day checked in.
    pub day: Date,
    /// Streak effect.
    pub status: CheckInStatus,
    /// Progression change.
    pub delta: ProgressionDelta,
}

/// Outcome of a command body: persist the working profile or leave it.
enum Effect<T> {
    /// Save the working profile under the next version.
    Commit(T),
    /// Accepted without a change to persist; the body left the profile untouched.
    Unchanged(T),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Progression engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Catalog failed load-time validation.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(CatalogError),
    /// Mission state-machine rejection.
    #[error(transparent)]
    Mission(#[from] MissionError),
    /// Skill unlock rejection.
    #[error(transparent)]
    Skill(#[from] SkillError),
    /// Reward rejection.
    #[error(transparent)]
    Reward(#[from] RewardError),
    /// Check-in day precedes the last recorded check-in.
    #[error("check-in day {day} precedes last check-in {last}")]
    CheckInOutOfOrder {
        /// Requested day.
        day: Date,
        /// Last recorded day.
        last: Date,
    },
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns a stable snake_case label used by audit events and the CLI.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCatalog(_) => "invalid_catalog",
            Self::Mission(err) => err.kind(),
            Self::Skill(err) => err.kind(),
            Self::Reward(err) => err.kind(),
            Self::CheckInOutOfOrder {
                ..
            } => "check_in_out_of_order",
            Self::Store(StoreError::VersionConflict {
                ..
            }) => "version_conflict",
            Self::Store(_) => "store",
        }
    }
}

// ============================================================================
// SECTION: Progression Engine
// ============================================================================

/// Progression engine executing commands against a profile store.
pub struct ProgressionEngine<S> {
    /// Validated catalog.
    catalog: Catalog,
    /// Profile store implementation.
    store: S,
    /// Audit sink for command events.
    audit: Arc<dyn AuditSink>,
    /// Engine configuration.
    config: EngineConfig,
    /// Per-user critical sections.
    user_locks: Mutex<BTreeMap<UserId, Arc<Mutex<()>>>>,
}

impl<S> ProgressionEngine<S>
where
    S: ProfileStore,
{
    /// Creates a new progression engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCatalog`] when the catalog fails validation.
    pub fn new(
        catalog: Catalog,
        store: S,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        catalog.validate().map_err(EngineError::InvalidCatalog)?;
        Ok(Self {
            catalog,
            store,
            audit,
            config,
            user_locks: Mutex::new(BTreeMap::new()),
        })
    }

    /// Returns the validated catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    /// Checks that the profile store can serve commands.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the store reports it is unavailable.
    pub fn readiness(&self) -> Result<(), EngineError> {
        Ok(self.store.readiness()?)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns the user's profile, or a fresh unsaved one on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn profile(&self, user_id: &UserId) -> Result<UserProfile, EngineError> {
        Ok(self.store.load(user_id)?.unwrap_or_else(|| self.fresh_profile(user_id)))
    }

    /// Returns the user's progression record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn progression(&self, user_id: &UserId) -> Result<ProgressionState, EngineError> {
        Ok(self.profile(user_id)?.progression)
    }

    /// Returns missions the user can start, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn available_missions(&self, user_id: &UserId) -> Result<Vec<Mission>, EngineError> {
        let profile = self.profile(user_id)?;
        Ok(missions::list_available(&self.catalog, &profile).cloned().collect())
    }

    /// Returns the user's active missions, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn active_missions(&self, user_id: &UserId) -> Result<Vec<UserMission>, EngineError> {
        let profile = self.profile(user_id)?;
        Ok(missions::list_active(&self.catalog, &profile).map(|(_, record)| record.clone()).collect())
    }

    /// Returns the user's completed missions, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn completed_missions(&self, user_id: &UserId) -> Result<Vec<UserMission>, EngineError> {
        let profile = self.profile(user_id)?;
        Ok(missions::list_completed(&self.catalog, &profile)
            .map(|(_, record)| record.clone())
            .collect())
    }

    /// Classifies every node of a skill tree for the user.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Skill`] for an unknown tree or
    /// [`EngineError::Store`] when loading fails.
    pub fn skill_nodes(
        &self,
        user_id: &UserId,
        tree_id: &SkillTreeId,
    ) -> Result<Vec<SkillNodeStatus>, EngineError> {
        let tree = self
            .catalog
            .skill_tree(tree_id)
            .ok_or_else(|| SkillError::UnknownTree(tree_id.clone()))?;
        let profile = self.profile(user_id)?;
        Ok(skills::node_statuses(tree, &profile))
    }

    /// Returns the user's reward ledger entries that are still in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn owned_rewards(&self, user_id: &UserId) -> Result<Vec<UserReward>, EngineError> {
        let profile = self.profile(user_id)?;
        Ok(rewards::list_owned(&self.catalog, &profile).map(|(_, entry)| entry.clone()).collect())
    }

    // ------------------------------------------------------------------------
    // Mission Commands
    // ------------------------------------------------------------------------

    /// Starts a mission.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the transition is rejected or persistence fails.
    pub fn start_mission(
        &self,
        user_id: &UserId,
        mission_id: &MissionId,
        at: Timestamp,
    ) -> Result<CommandReceipt<UserMission>, EngineError> {
        self.execute("start_mission", user_id, Some(mission_id.to_string()), at, |catalog, profile| {
            Ok(Effect::Commit(missions::start(catalog, profile, mission_id, at)?))
        })
    }

    /// Updates mission progress, completing the mission at 100.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the transition is rejected or persistence fails.
    pub fn update_mission_progress(
        &self,
        user_id: &UserId,
        mission_id: &MissionId,
        progress: i64,
        at: Timestamp,
    ) -> Result<CommandReceipt<ProgressUpdate>, EngineError> {
        self.execute(
            "update_mission_progress",
            user_id,
            Some(mission_id.to_string()),
            at,
            |catalog, profile| {
                Ok(Effect::Commit(missions::update_progress(
                    catalog, profile, mission_id, progress, at,
                )?))
            },
        )
    }

    /// Completes an active mission and credits its rewards once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the transition is rejected or persistence fails.
    pub fn complete_mission(
        &self,
        user_id: &UserId,
        mission_id: &MissionId,
        at: Timestamp,
    ) -> Result<CommandReceipt<MissionCompletion>, EngineError> {
        self.execute("complete_mission", user_id, Some(mission_id.to_string()), at, |catalog, profile| {
            Ok(Effect::Commit(missions::complete(catalog, profile, mission_id, at)?))
        })
    }

    /// Abandons an active mission.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the transition is rejected or persistence fails.
    pub fn abandon_mission(
        &self,
        user_id: &UserId,
        mission_id: &MissionId,
        at: Timestamp,
    ) -> Result<CommandReceipt<UserMission>, EngineError> {
        self.execute("abandon_mission", user_id, Some(mission_id.to_string()), at, |_, profile| {
            Ok(Effect::Commit(missions::abandon(profile, mission_id)?))
        })
    }

    // ------------------------------------------------------------------------
    // Skill and Reward Commands
    // ------------------------------------------------------------------------

    /// Unlocks a skill node.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the unlock is rejected or persistence fails.
    pub fn unlock_skill(
        &self,
        user_id: &UserId,
        tree_id: &SkillTreeId,
        node_id: &SkillNodeId,
        at: Timestamp,
    ) -> Result<CommandReceipt<SkillUnlock>, EngineError> {
        self.execute("unlock_skill", user_id, Some(node_id.to_string()), at, |catalog, profile| {
            Ok(Effect::Commit(skills::unlock(catalog, profile, tree_id, node_id, at)?))
        })
    }

    /// Buys a reward with coins.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the purchase is rejected or persistence fails.
    pub fn redeem_reward(
        &self,
        user_id: &UserId,
        reward_id: &RewardId,
        context: &str,
        at: Timestamp,
    ) -> Result<CommandReceipt<RewardGrant>, EngineError> {
        self.execute("redeem_reward", user_id, Some(reward_id.to_string()), at, |catalog, profile| {
            Ok(Effect::Commit(rewards::redeem(catalog, profile, reward_id, context, at)?))
        })
    }

    /// Grants a reward without payment.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the grant is rejected or persistence fails.
    pub fn earn_reward(
        &self,
        user_id: &UserId,
        reward_id: &RewardId,
        context: &str,
        at: Timestamp,
    ) -> Result<CommandReceipt<RewardGrant>, EngineError> {
        self.execute("earn_reward", user_id, Some(reward_id.to_string()), at, |catalog, profile| {
            Ok(Effect::Commit(rewards::earn(catalog, profile, reward_id, context, at)?))
        })
    }

    // ------------------------------------------------------------------------
    // Streak and Profile Commands
    // ------------------------------------------------------------------------

    /// Increments the streak or decays it by one day.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when persistence fails.
    pub fn record_streak(
        &self,
        user_id: &UserId,
        increment: bool,
        at: Timestamp,
    ) -> Result<CommandReceipt<ProgressionDelta>, EngineError> {
        self.execute("record_streak", user_id, None, at, |_, profile| {
            let before = profile.progression;
            profile.progression = before.apply_streak(increment);
            Ok(Effect::Commit(ProgressionDelta::between(&before, &profile.progression)))
        })
    }

    /// Records daily activity for a calendar day and updates the streak.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CheckInOutOfOrder`] for a day before the last
    /// check-in, or [`EngineError::Store`] when persistence fails.
    pub fn check_in(
        &self,
        user_id: &UserId,
        day: Date,
        at: Timestamp,
    ) -> Result<CommandReceipt<CheckIn>, EngineError> {
        self.execute("check_in", user_id, Some(day.to_string()), at, |_, profile| {
            let before = profile.progression;
            let status = match profile.last_check_in {
                None => CheckInStatus::Started,
                Some(last) if last == day => CheckInStatus::AlreadyCheckedIn,
                Some(last) if day < last => {
                    return Err(EngineError::CheckInOutOfOrder {
                        day,
                        last,
                    });
                }
                Some(last) if last.next_day() == Some(day) => CheckInStatus::Continued,
                Some(_) => CheckInStatus::Decayed,
            };
            let checked_in = |delta| CheckIn {
                day,
                status,
                delta,
            };
            if status == CheckInStatus::AlreadyCheckedIn {
                return Ok(Effect::Unchanged(checked_in(ProgressionDelta::between(
                    &before, &before,
                ))));
            }
            profile.progression = before.apply_streak(status != CheckInStatus::Decayed);
            profile.last_check_in = Some(day);
            Ok(Effect::Commit(checked_in(ProgressionDelta::between(&before, &profile.progression))))
        })
    }

    /// Reinitializes the user's profile to defaults (seeded LifeScore, no records).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when persistence fails.
    pub fn reset_profile(
        &self,
        user_id: &UserId,
        at: Timestamp,
    ) -> Result<CommandReceipt<ProgressionDelta>, EngineError> {
        let fresh = self.fresh_profile(user_id);
        self.execute("reset_profile", user_id, None, at, move |_, profile| {
            let before = profile.progression;
            let version = profile.version;
            *profile = UserProfile {
                version,
                ..fresh
            };
            Ok(Effect::Commit(ProgressionDelta::between(&before, &profile.progression)))
        })
    }

    // ------------------------------------------------------------------------
    // Command Execution
    // ------------------------------------------------------------------------

    /// Builds a never-saved profile seeded from the engine configuration.
    fn fresh_profile(&self, user_id: &UserId) -> UserProfile {
        UserProfile::new(
            user_id.clone(),
            ProgressionState::with_starting_lifescore(self.config.starting_lifescore),
        )
    }

    /// Returns the critical-section lock for a user.
    fn user_lock(&self, user_id: &UserId) -> Result<Arc<Mutex<()>>, EngineError> {
        let mut locks = self
            .user_locks
            .lock()
            .map_err(|_| StoreError::Store("user lock table mutex poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(user_id.clone()).or_default()))
    }

    /// Drops the user's lock entry once no other command holds a handle to it.
    ///
    /// Handles are only cloned under the table lock, so a strong count of one
    /// observed there means no command is running or waiting for this user.
    fn release_user_lock(&self, user_id: &UserId, lock: Arc<Mutex<()>>) {
        drop(lock);
        let Ok(mut locks) = self.user_locks.lock() else {
            return;
        };
        if locks.get(user_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(user_id);
        }
    }

    /// Returns how many users currently have a lock entry.
    #[cfg(test)]
    fn tracked_user_locks(&self) -> usize {
        self.user_locks.lock().map_or(0, |locks| locks.len())
    }

    /// Runs one command inside the user's critical section, then audits it.
    fn execute<T, F>(
        &self,
        command: &'static str,
        user_id: &UserId,
        subject: Option<String>,
        at: Timestamp,
        body: F,
    ) -> Result<CommandReceipt<T>, EngineError>
    where
        F: FnOnce(&Catalog, &mut UserProfile) -> Result<Effect<T>, EngineError>,
    {
        let mut observed_version = 0;
        let result = self.commit(user_id, &mut observed_version, body);
        let event = match &result {
            Ok((profile, _)) => ProgressionAuditEvent::accepted(command, at, subject, profile),
            Err(err) => ProgressionAuditEvent::rejected(
                command,
                at,
                user_id,
                subject,
                observed_version,
                err.kind(),
            ),
        };
        self.audit.record(&event);
        let (profile, result) = result?;
        Ok(CommandReceipt {
            user_id: profile.user_id,
            profile_version: profile.version,
            progression: profile.progression,
            result,
        })
    }

    /// Loads, transforms, and saves one profile under the user's lock.
    fn commit<T, F>(
        &self,
        user_id: &UserId,
        observed_version: &mut u64,
        body: F,
    ) -> Result<(UserProfile, T), EngineError>
    where
        F: FnOnce(&Catalog, &mut UserProfile) -> Result<Effect<T>, EngineError>,
    {
        let lock = self.user_lock(user_id)?;
        let result = match lock.lock() {
            Ok(_guard) => self.apply_locked(user_id, observed_version, body),
            Err(_) => Err(StoreError::Store("user lock mutex poisoned".to_string()).into()),
        };
        self.release_user_lock(user_id, lock);
        result
    }

    /// Runs the command body and persists the result; the caller holds the user lock.
    fn apply_locked<T, F>(
        &self,
        user_id: &UserId,
        observed_version: &mut u64,
        body: F,
    ) -> Result<(UserProfile, T), EngineError>
    where
        F: FnOnce(&Catalog, &mut UserProfile) -> Result<Effect<T>, EngineError>,
    {
        let mut profile = self.profile(user_id)?;
        let expected_version = profile.version;
        *observed_version = expected_version;
        match body(&self.catalog, &mut profile)? {
            Effect::Unchanged(result) => Ok((profile, result)),
            Effect::Commit(result) => {
                profile.version = expected_version.saturating_add(1);
                self.store.save(&profile, expected_version)?;
                Ok((profile, result))
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
