// crates/lifescore-core/src/runtime/requirements.rs
// ============================================================================
// Module: LifeScore Requirement Evaluation
// Description: Local evaluation of mission and skill gating conditions.
// Purpose: Report every unmet condition so rejections can be explained.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Requirements are optional-field structs with explicit presence checks.
//! Evaluation is local to one catalog entry: prerequisite skills must already
//! be unlocked, which enforces the skill graph at unlock time without any
//! traversal. Absent fields impose no condition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::MissionId;
use crate::core::MissionRequirements;
use crate::core::SkillNodeId;
use crate::core::SkillRequirements;
use crate::core::UserProfile;

// ============================================================================
// SECTION: Unmet Requirements
// ============================================================================

/// A single gating condition the user does not satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnmetRequirement {
    /// Level is below the minimum.
    MinLevel {
        /// Required level.
        required: u64,
        /// Current level.
        actual: u64,
    },
    /// Prerequisite skill node is not unlocked.
    MissingSkill {
        /// Missing node.
        node_id: SkillNodeId,
    },
    /// Prerequisite mission is not completed.
    MissingMission {
        /// Missing mission.
        mission_id: MissionId,
    },
    /// Lifetime XP is below the threshold.
    Xp {
        /// Required XP.
        required: u64,
        /// Current XP.
        actual: u64,
    },
    /// LifeScore is below the threshold.
    LifeScore {
        /// Required LifeScore.
        required: u32,
        /// Current LifeScore.
        actual: u32,
    },
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates mission start requirements against a profile.
#[must_use]
pub fn mission_requirements(
    requirements: &MissionRequirements,
    profile: &UserProfile,
) -> Vec<UnmetRequirement> {
    let mut unmet = Vec::new();
    push_min_level(&mut unmet, requirements.min_level, profile);
    push_missing_missions(&mut unmet, &requirements.required_missions, profile);
    push_missing_skills(&mut unmet, &requirements.required_skills, profile);
    unmet
}

/// Evaluates skill unlock requirements against a profile.
#[must_use]
pub fn skill_requirements(
    requirements: &SkillRequirements,
    profile: &UserProfile,
) -> Vec<UnmetRequirement> {
    let mut unmet = Vec::new();
    let progression = &profile.progression;
    push_min_level(&mut unmet, requirements.min_level, profile);
    push_missing_skills(&mut unmet, &requirements.required_skills, profile);
    push_missing_missions(&mut unmet, &requirements.missions_completed, profile);
    if let Some(required) = requirements.xp_required
        && progression.xp() < required
    {
        unmet.push(UnmetRequirement::Xp {
            required,
            actual: progression.xp(),
        });
    }
    if let Some(required) = requirements.lifescore_threshold
        && progression.lifescore() < required
    {
        unmet.push(UnmetRequirement::LifeScore {
            required,
            actual: progression.lifescore(),
        });
    }
    unmet
}

/// Records a level shortfall.
fn push_min_level(unmet: &mut Vec<UnmetRequirement>, min_level: Option<u64>, profile: &UserProfile) {
    let actual = profile.progression.level();
    if let Some(required) = min_level
        && actual < required
    {
        unmet.push(UnmetRequirement::MinLevel {
            required,
            actual,
        });
    }
}

/// Records prerequisite missions that are not completed.
fn push_missing_missions(
    unmet: &mut Vec<UnmetRequirement>,
    required: &[MissionId],
    profile: &UserProfile,
) {
    let completed = profile.completed_mission_ids();
    for mission_id in required {
        if !completed.contains(mission_id) {
            unmet.push(UnmetRequirement::MissingMission {
                mission_id: mission_id.clone(),
            });
        }
    }
}

/// Records prerequisite skills that are not unlocked.
fn push_missing_skills(
    unmet: &mut Vec<UnmetRequirement>,
    required: &[SkillNodeId],
    profile: &UserProfile,
) {
    let unlocked = profile.unlocked_skill_ids();
    for node_id in required {
        if !unlocked.contains(node_id) {
            unmet.push(UnmetRequirement::MissingSkill {
                node_id: node_id.clone(),
            });
        }
    }
}
