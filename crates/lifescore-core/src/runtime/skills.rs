// crates/lifescore-core/src/runtime/skills.rs
// ============================================================================
// Module: LifeScore Skill Resolver
// Description: Unlockability queries and guarded unlock transitions.
// Purpose: Gate skill nodes on level, XP, LifeScore, missions, and prerequisites.
// Dependencies: crate::core, crate::runtime::requirements, serde, thiserror
// ============================================================================

//! ## Overview
//! A node is unlockable when it is not yet unlocked and every declared
//! requirement holds for the current profile. Unlocking additionally checks
//! that the user can afford the XP cost; unlike the raw XP primitive, an
//! unaffordable spend is rejected instead of clamped.
//!
//! Checks are local to one node. Prerequisites must already be unlocked, so
//! the resolver never walks the graph and cannot loop on a malformed catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Catalog;
use crate::core::ProgressionDelta;
use crate::core::SkillNode;
use crate::core::SkillNodeId;
use crate::core::SkillTree;
use crate::core::SkillTreeId;
use crate::core::Timestamp;
use crate::core::UserProfile;
use crate::core::UserSkill;
use crate::runtime::requirements::UnmetRequirement;
use crate::runtime::requirements::skill_requirements;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Per-user classification of a skill node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// At least one requirement is unmet.
    Locked,
    /// All requirements hold; the node can be unlocked if affordable.
    Unlockable,
    /// Already unlocked.
    Unlocked,
}

/// Skill node view returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillNodeStatus {
    /// Owning tree.
    pub tree_id: SkillTreeId,
    /// Node identifier.
    pub node_id: SkillNodeId,
    /// Classification.
    pub status: NodeStatus,
    /// XP cost to unlock.
    pub xp_cost: u64,
    /// Unmet requirements for locked nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmet: Vec<UnmetRequirement>,
}

/// Result of an unlock transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUnlock {
    /// Unlocked skill record.
    pub skill: UserSkill,
    /// Progression change: cost spent, then bonus applied.
    pub delta: ProgressionDelta,
}

/// Skill unlock rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillError {
    /// Tree is not in the catalog.
    #[error("unknown skill tree: {0}")]
    UnknownTree(SkillTreeId),
    /// Node is not in the tree.
    #[error("unknown skill node {node_id} in tree {tree_id}")]
    UnknownNode {
        /// Tree identifier.
        tree_id: SkillTreeId,
        /// Node identifier.
        node_id: SkillNodeId,
    },
    /// Node is already unlocked.
    #[error("skill node {0} is already unlocked")]
    AlreadyUnlocked(SkillNodeId),
    /// At least one requirement is unmet.
    #[error("skill node {node_id} requirements not met ({} unmet)", .unmet.len())]
    RequirementsNotMet {
        /// Node identifier.
        node_id: SkillNodeId,
        /// Unsatisfied conditions.
        unmet: Vec<UnmetRequirement>,
    },
    /// XP balance is below the unlock cost.
    #[error("skill node {node_id} costs {required} xp but only {available} is available")]
    InsufficientXp {
        /// Node identifier.
        node_id: SkillNodeId,
        /// Unlock cost.
        required: u64,
        /// Current XP.
        available: u64,
    },
}

impl SkillError {
    /// Returns a stable snake_case label for the rejection.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTree(_) => "unknown_skill_tree",
            Self::UnknownNode {
                ..
            } => "unknown_skill_node",
            Self::AlreadyUnlocked(_) => "already_unlocked",
            Self::RequirementsNotMet {
                ..
            } => "requirements_not_met",
            Self::InsufficientXp {
                ..
            } => "insufficient_xp",
        }
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Returns every unmet requirement of a node for the profile.
#[must_use]
pub fn check_requirements(node: &SkillNode, profile: &UserProfile) -> Vec<UnmetRequirement> {
    skill_requirements(&node.requirements, profile)
}

/// Returns true when the profile has unlocked the node.
#[must_use]
pub fn is_unlocked(profile: &UserProfile, tree: &SkillTree, node: &SkillNode) -> bool {
    profile.skill(&tree.tree_id, &node.node_id).is_some_and(|skill| skill.unlocked)
}

/// Lists unlockable nodes of a tree in tree order.
pub fn get_unlockable<'a>(
    tree: &'a SkillTree,
    profile: &'a UserProfile,
) -> impl Iterator<Item = &'a SkillNode> + 'a {
    tree.nodes.iter().filter(move |node| {
        !is_unlocked(profile, tree, node) && check_requirements(node, profile).is_empty()
    })
}

/// Classifies every node of a tree in tree order.
#[must_use]
pub fn node_statuses(tree: &SkillTree, profile: &UserProfile) -> Vec<SkillNodeStatus> {
    tree.nodes
        .iter()
        .map(|node| {
            let (status, unmet) = if is_unlocked(profile, tree, node) {
                (NodeStatus::Unlocked, Vec::new())
            } else {
                let unmet = check_requirements(node, profile);
                if unmet.is_empty() {
                    (NodeStatus::Unlockable, unmet)
                } else {
                    (NodeStatus::Locked, unmet)
                }
            };
            SkillNodeStatus {
                tree_id: tree.tree_id.clone(),
                node_id: node.node_id.clone(),
                status,
                xp_cost: node.xp_cost,
                unmet,
            }
        })
        .collect()
}

// ============================================================================
// SECTION: Unlock
// ============================================================================

/// Unlocks a node, spending its XP cost and applying its bonus.
///
/// Effects apply in order: spend `xp_cost`, add bonus XP, add bonus
/// LifeScore. Nothing changes when the call fails.
///
/// # Errors
///
/// Returns [`SkillError`] when the tree or node is unknown, the node is
/// already unlocked, a requirement is unmet, or XP is insufficient.
pub fn unlock(
    catalog: &Catalog,
    profile: &mut UserProfile,
    tree_id: &SkillTreeId,
    node_id: &SkillNodeId,
    at: Timestamp,
) -> Result<SkillUnlock, SkillError> {
    let tree = catalog.skill_tree(tree_id).ok_or_else(|| SkillError::UnknownTree(tree_id.clone()))?;
    let node = tree.node(node_id).ok_or_else(|| SkillError::UnknownNode {
        tree_id: tree_id.clone(),
        node_id: node_id.clone(),
    })?;
    if is_unlocked(profile, tree, node) {
        return Err(SkillError::AlreadyUnlocked(node_id.clone()));
    }
    let unmet = check_requirements(node, profile);
    if !unmet.is_empty() {
        return Err(SkillError::RequirementsNotMet {
            node_id: node_id.clone(),
            unmet,
        });
    }
    let before = profile.progression;
    if node.xp_cost > before.xp() {
        return Err(SkillError::InsufficientXp {
            node_id: node_id.clone(),
            required: node.xp_cost,
            available: before.xp(),
        });
    }
    let after = before
        .spend_xp(node.xp_cost)
        .state
        .earn_xp(node.bonus.xp)
        .state
        .apply_lifescore(node.bonus.lifescore);
    let skill = UserSkill {
        tree_id: tree_id.clone(),
        node_id: node_id.clone(),
        unlocked: true,
        progress: 100,
        unlocked_at: Some(at),
    };
    match profile
        .skills
        .iter_mut()
        .find(|existing| &existing.tree_id == tree_id && &existing.node_id == node_id)
    {
        Some(existing) => *existing = skill.clone(),
        None => profile.skills.push(skill.clone()),
    }
    profile.progression = after;
    Ok(SkillUnlock {
        skill,
        delta: ProgressionDelta::between(&before, &after),
    })
}
