// crates/lifescore-core/src/runtime/missions.rs
// ============================================================================
// Module: LifeScore Mission Lifecycle
// Description: NONE -> ACTIVE -> COMPLETED state machine per user and mission.
// Purpose: Start, advance, complete, and abandon missions with frozen rewards.
// Dependencies: crate::core, crate::runtime::requirements, serde, thiserror
// ============================================================================

//! ## Overview
//! Mission transitions operate on one [`UserProfile`]. Every rejection is
//! detected before the profile is touched, so a failed call leaves the
//! profile unchanged. Completion is terminal: a completed record is never
//! modified again and its rewards are credited exactly once.
//!
//! Requirements are enforced for solo missions only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Catalog;
use crate::core::Mission;
use crate::core::MissionId;
use crate::core::MissionStatus;
use crate::core::ProgressionDelta;
use crate::core::Timestamp;
use crate::core::UserMission;
use crate::core::UserProfile;
use crate::runtime::requirements::UnmetRequirement;
use crate::runtime::requirements::mission_requirements;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Progress value that marks a mission as finished.
pub const PROGRESS_COMPLETE: u8 = 100;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Result of a completion transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionCompletion {
    /// Completed, now immutable, mission record with frozen rewards.
    pub mission: UserMission,
    /// Progression change caused by the rewards.
    pub delta: ProgressionDelta,
}

/// Result of a progress update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Mission record after the update.
    pub mission: UserMission,
    /// Completion triggered by reaching full progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<MissionCompletion>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Mission state-machine rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissionError {
    /// Mission is not in the catalog.
    #[error("unknown mission: {0}")]
    UnknownMission(MissionId),
    /// A record already exists for the mission.
    #[error("mission {0} is already active or completed")]
    AlreadyActiveOrCompleted(MissionId),
    /// Solo mission requirements are not satisfied.
    #[error("mission {mission_id} requirements not met ({} unmet)", .unmet.len())]
    RequirementsNotMet {
        /// Mission identifier.
        mission_id: MissionId,
        /// Unsatisfied conditions.
        unmet: Vec<UnmetRequirement>,
    },
    /// No active record exists for the mission.
    #[error("mission {0} is not active")]
    NotActive(MissionId),
    /// The record is completed and immutable.
    #[error("mission {0} is already completed")]
    AlreadyCompleted(MissionId),
}

impl MissionError {
    /// Returns a stable snake_case label for the rejection.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownMission(_) => "unknown_mission",
            Self::AlreadyActiveOrCompleted(_) => "already_active_or_completed",
            Self::RequirementsNotMet {
                ..
            } => "requirements_not_met",
            Self::NotActive(_) => "not_active",
            Self::AlreadyCompleted(_) => "already_completed",
        }
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Lists startable missions lazily in catalog order.
///
/// Missions with an existing record are skipped, as are solo missions whose
/// requirements the profile does not meet.
pub fn list_available<'a>(
    catalog: &'a Catalog,
    profile: &'a UserProfile,
) -> impl Iterator<Item = &'a Mission> + 'a {
    catalog.missions.iter().filter(move |mission| {
        profile.mission(&mission.mission_id).is_none()
            && (!mission.enforces_requirements()
                || mission_requirements(&mission.requirements, profile).is_empty())
    })
}

/// Lists active missions in catalog order.
pub fn list_active<'a>(
    catalog: &'a Catalog,
    profile: &'a UserProfile,
) -> impl Iterator<Item = (&'a Mission, &'a UserMission)> + 'a {
    with_status(catalog, profile, MissionStatus::Active)
}

/// Lists completed missions in catalog order.
pub fn list_completed<'a>(
    catalog: &'a Catalog,
    profile: &'a UserProfile,
) -> impl Iterator<Item = (&'a Mission, &'a UserMission)> + 'a {
    with_status(catalog, profile, MissionStatus::Completed)
}

/// Pairs catalog missions with user records of the given status.
fn with_status<'a>(
    catalog: &'a Catalog,
    profile: &'a UserProfile,
    status: MissionStatus,
) -> impl Iterator<Item = (&'a Mission, &'a UserMission)> + 'a {
    catalog.missions.iter().filter_map(move |mission| {
        profile
            .mission(&mission.mission_id)
            .filter(|record| record.status == status)
            .map(|record| (mission, record))
    })
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

/// Starts a mission: NONE -> ACTIVE with zero progress. Starting is free.
///
/// # Errors
///
/// Returns [`MissionError`] when the mission is unknown, a record already
/// exists, or solo requirements are unmet.
pub fn start(
    catalog: &Catalog,
    profile: &mut UserProfile,
    mission_id: &MissionId,
    at: Timestamp,
) -> Result<UserMission, MissionError> {
    let mission = lookup(catalog, mission_id)?;
    if profile.mission(mission_id).is_some() {
        return Err(MissionError::AlreadyActiveOrCompleted(mission_id.clone()));
    }
    if mission.enforces_requirements() {
        let unmet = mission_requirements(&mission.requirements, profile);
        if !unmet.is_empty() {
            return Err(MissionError::RequirementsNotMet {
                mission_id: mission_id.clone(),
                unmet,
            });
        }
    }
    let record = UserMission {
        mission_id: mission_id.clone(),
        status: MissionStatus::Active,
        progress: 0,
        started_at: at,
        updated_at: at,
        completed_at: None,
        xp_earned: 0,
        lifescore_change: 0,
        coins_earned: 0,
    };
    profile.missions.insert(mission_id.clone(), record.clone());
    Ok(record)
}

/// Sets mission progress, clamped to `[0, 100]`.
///
/// Reaching 100 completes the mission in the same call, so an active record
/// never rests at full progress.
///
/// # Errors
///
/// Returns [`MissionError`] when the mission is unknown, has no record, or
/// is already completed.
pub fn update_progress(
    catalog: &Catalog,
    profile: &mut UserProfile,
    mission_id: &MissionId,
    progress: i64,
    at: Timestamp,
) -> Result<ProgressUpdate, MissionError> {
    let mission = lookup(catalog, mission_id)?;
    ensure_active(profile, mission_id)?;
    let clamped = clamp_progress(progress);
    if clamped >= PROGRESS_COMPLETE {
        let completion = apply_completion(mission, profile, at)?;
        return Ok(ProgressUpdate {
            mission: completion.mission.clone(),
            completion: Some(completion),
        });
    }
    let record = profile
        .missions
        .get_mut(mission_id)
        .ok_or_else(|| MissionError::NotActive(mission_id.clone()))?;
    record.progress = clamped;
    record.updated_at = at;
    Ok(ProgressUpdate {
        mission: record.clone(),
        completion: None,
    })
}

/// Completes an active mission: ACTIVE -> COMPLETED.
///
/// Freezes the catalog's current rewards into the record and credits XP,
/// LifeScore, and coins to the profile exactly once.
///
/// # Errors
///
/// Returns [`MissionError::AlreadyCompleted`] on a repeated call (rewards
/// are not re-applied), or another [`MissionError`] when the mission is
/// unknown or has no record.
pub fn complete(
    catalog: &Catalog,
    profile: &mut UserProfile,
    mission_id: &MissionId,
    at: Timestamp,
) -> Result<MissionCompletion, MissionError> {
    let mission = lookup(catalog, mission_id)?;
    ensure_active(profile, mission_id)?;
    apply_completion(mission, profile, at)
}

/// Abandons an active mission, deleting its record so it is re-offered.
///
/// # Errors
///
/// Returns [`MissionError::NotActive`] without a record, or
/// [`MissionError::AlreadyCompleted`] for a completed record.
pub fn abandon(profile: &mut UserProfile, mission_id: &MissionId) -> Result<UserMission, MissionError> {
    ensure_active(profile, mission_id)?;
    profile.missions.remove(mission_id).ok_or_else(|| MissionError::NotActive(mission_id.clone()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves a catalog mission.
fn lookup<'a>(catalog: &'a Catalog, mission_id: &MissionId) -> Result<&'a Mission, MissionError> {
    catalog.mission(mission_id).ok_or_else(|| MissionError::UnknownMission(mission_id.clone()))
}

/// Ensures the profile holds an active record for the mission.
fn ensure_active(profile: &UserProfile, mission_id: &MissionId) -> Result<(), MissionError> {
    match profile.mission(mission_id) {
        None => Err(MissionError::NotActive(mission_id.clone())),
        Some(record) if record.is_completed() => {
            Err(MissionError::AlreadyCompleted(mission_id.clone()))
        }
        Some(_) => Ok(()),
    }
}

/// Clamps raw progress into `[0, 100]`.
fn clamp_progress(progress: i64) -> u8 {
    let clamped = progress.clamp(0, i64::from(PROGRESS_COMPLETE));
    u8::try_from(clamped).unwrap_or(PROGRESS_COMPLETE)
}

/// Performs the completion transition on a record already known to be active.
fn apply_completion(
    mission: &Mission,
    profile: &mut UserProfile,
    at: Timestamp,
) -> Result<MissionCompletion, MissionError> {
    let before = profile.progression;
    let after = before
        .earn_xp(mission.xp_reward)
        .state
        .apply_lifescore(mission.lifescore_impact)
        .earn_coins(mission.coin_reward);
    let record = profile
        .missions
        .get_mut(&mission.mission_id)
        .ok_or_else(|| MissionError::NotActive(mission.mission_id.clone()))?;
    record.status = MissionStatus::Completed;
    record.progress = PROGRESS_COMPLETE;
    record.updated_at = at;
    record.completed_at = Some(at);
    record.xp_earned = mission.xp_reward;
    record.lifescore_change = mission.lifescore_impact;
    record.coins_earned = mission.coin_reward;
    let mission_record = record.clone();
    profile.progression = after;
    Ok(MissionCompletion {
        mission: mission_record,
        delta: ProgressionDelta::between(&before, &after),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
