// crates/lifescore-core/src/core/catalog.rs
// ============================================================================
// Module: LifeScore Catalogs
// Description: Immutable mission, skill-tree, and reward catalog entries.
// Purpose: Define catalog data with load-time validation of references and DAG shape.
// Dependencies: crate::core::{hashing, identifiers}, serde, thiserror
// ============================================================================

//! ## Overview
//! Catalogs are static data supplied by the host. They are validated once at
//! load time: identifiers must be unique, every reference must resolve, the
//! redundant `children` pointers of a skill tree must agree with each child's
//! `required_skills`, and neither the skill prerequisite graph nor the
//! mission prerequisite graph may contain a cycle. Gating always reads
//! `required_skills`; `children` is informational once validated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::MissionId;
use crate::core::identifiers::RewardId;
use crate::core::identifiers::SkillNodeId;
use crate::core::identifiers::SkillTreeId;

// ============================================================================
// SECTION: Missions
// ============================================================================

/// Product line a mission or skill tree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionCategory {
    /// Driving behaviour.
    SafeDriving,
    /// Physical and mental health.
    Health,
    /// Savings and financial resilience.
    FinancialGuardian,
    /// Household and dependants coverage.
    FamilyProtection,
    /// Everyday habits.
    Lifestyle,
}

/// Mission difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Easy tier.
    Easy,
    /// Medium tier.
    Medium,
    /// Hard tier.
    Hard,
    /// Highest tier (also accepted as `expert`).
    #[serde(alias = "expert")]
    Epic,
}

/// Start-time requirements for a mission.
///
/// Requirements are enforced for solo missions only; on collaborative
/// missions they are advisory metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionRequirements {
    /// Minimum level required to start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<u64>,
    /// Missions that must already be completed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_missions: Vec<MissionId>,
    /// Skill nodes that must already be unlocked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_skills: Vec<SkillNodeId>,
}

/// Immutable mission catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Mission identifier.
    pub mission_id: MissionId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Product category.
    pub category: MissionCategory,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// XP credited on completion.
    pub xp_reward: u64,
    /// Coins credited on completion.
    #[serde(default)]
    pub coin_reward: u64,
    /// LifeScore change applied on completion (may be negative).
    #[serde(default)]
    pub lifescore_impact: i64,
    /// Whether several users take part together.
    #[serde(default)]
    pub is_collaborative: bool,
    /// Maximum participants (at least one).
    #[serde(default = "default_max_participants")]
    pub max_participants: u32,
    /// Nominal mission duration in days.
    pub duration_days: u32,
    /// Start-time requirements.
    #[serde(default)]
    pub requirements: MissionRequirements,
}

impl Mission {
    /// Returns true when start-time requirements are enforced.
    #[must_use]
    pub const fn enforces_requirements(&self) -> bool {
        !self.is_collaborative
    }
}

/// Default participant limit for missions that omit it.
const fn default_max_participants() -> u32 {
    1
}

// ============================================================================
// SECTION: Skill Trees
// ============================================================================

/// Unlock requirements for a skill node. Absent fields impose no condition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillRequirements {
    /// Minimum level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<u64>,
    /// Prerequisite skill nodes that must be unlocked (may span trees).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_skills: Vec<SkillNodeId>,
    /// Missions that must be completed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missions_completed: Vec<MissionId>,
    /// Minimum lifetime XP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp_required: Option<u64>,
    /// Minimum LifeScore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifescore_threshold: Option<u32>,
}

/// Bonus granted when a node is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillBonus {
    /// XP added after the unlock cost is spent.
    #[serde(default)]
    pub xp: u64,
    /// LifeScore change.
    #[serde(default)]
    pub lifescore: i64,
}

/// Unlockable skill node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillNode {
    /// Node identifier.
    pub node_id: SkillNodeId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// XP spent to unlock.
    pub xp_cost: u64,
    /// Unlock requirements.
    #[serde(default)]
    pub requirements: SkillRequirements,
    /// Child nodes within the same tree (informational).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SkillNodeId>,
    /// Bonus applied on unlock.
    #[serde(default)]
    pub bonus: SkillBonus,
}

/// Immutable skill tree catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTree {
    /// Tree identifier.
    pub tree_id: SkillTreeId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Product category.
    pub category: MissionCategory,
    /// Nodes in display order.
    pub nodes: Vec<SkillNode>,
}

impl SkillTree {
    /// Returns the node with the given identifier.
    #[must_use]
    pub fn node(&self, node_id: &SkillNodeId) -> Option<&SkillNode> {
        self.nodes.iter().find(|node| &node.node_id == node_id)
    }
}

// ============================================================================
// SECTION: Rewards
// ============================================================================

/// Reward kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    /// Collectible badge.
    Badge,
    /// Temporary coin multiplier.
    CoinBoost,
    /// Partner discount or offer.
    PartnerOffer,
    /// Streak bonus.
    StreakBonus,
    /// Achievement marker.
    Achievement,
}

/// Badge rarity (informational).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
    /// Common.
    Common,
    /// Rare.
    Rare,
    /// Epic.
    Epic,
    /// Legendary.
    Legendary,
}

/// Immutable reward catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Reward identifier.
    pub reward_id: RewardId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Reward kind.
    pub reward_type: RewardType,
    /// Coin price; zero means the reward can only be earned.
    #[serde(default)]
    pub coins_cost: u64,
    /// Badge rarity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_rarity: Option<BadgeRarity>,
}

impl Reward {
    /// Returns true when the reward can be bought with coins.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.coins_cost > 0
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Complete static catalog consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Missions in display order.
    #[serde(default)]
    pub missions: Vec<Mission>,
    /// Skill trees in display order.
    #[serde(default)]
    pub skill_trees: Vec<SkillTree>,
    /// Rewards in display order.
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

impl Catalog {
    /// Returns the mission with the given identifier.
    #[must_use]
    pub fn mission(&self, mission_id: &MissionId) -> Option<&Mission> {
        self.missions.iter().find(|mission| &mission.mission_id == mission_id)
    }

    /// Returns the skill tree with the given identifier.
    #[must_use]
    pub fn skill_tree(&self, tree_id: &SkillTreeId) -> Option<&SkillTree> {
        self.skill_trees.iter().find(|tree| &tree.tree_id == tree_id)
    }

    /// Returns a node and its owning tree by node identifier.
    #[must_use]
    pub fn skill_node(&self, node_id: &SkillNodeId) -> Option<(&SkillTree, &SkillNode)> {
        self.skill_nodes().find(|(_, node)| &node.node_id == node_id)
    }

    /// Iterates every node of every tree in catalog order.
    pub fn skill_nodes(&self) -> impl Iterator<Item = (&SkillTree, &SkillNode)> {
        self.skill_trees.iter().flat_map(|tree| tree.nodes.iter().map(move |node| (tree, node)))
    }

    /// Returns the reward with the given identifier.
    #[must_use]
    pub fn reward(&self, reward_id: &RewardId) -> Option<&Reward> {
        self.rewards.iter().find(|reward| &reward.reward_id == reward_id)
    }

    /// Computes the canonical fingerprint of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when serialization fails.
    pub fn fingerprint(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(DEFAULT_HASH_ALGORITHM, self)
    }

    /// Validates catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on the first violated invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        ensure_unique(
            self.missions.iter().map(|mission| mission.mission_id.as_str()),
            CatalogError::DuplicateMission,
        )?;
        ensure_unique(
            self.skill_trees.iter().map(|tree| tree.tree_id.as_str()),
            CatalogError::DuplicateSkillTree,
        )?;
        ensure_unique(
            self.skill_nodes().map(|(_, node)| node.node_id.as_str()),
            CatalogError::DuplicateSkillNode,
        )?;
        ensure_unique(
            self.rewards.iter().map(|reward| reward.reward_id.as_str()),
            CatalogError::DuplicateReward,
        )?;
        self.ensure_missions_well_formed()?;
        self.ensure_skill_references_resolve()?;
        self.ensure_child_links_consistent()?;
        self.ensure_acyclic()?;
        Ok(())
    }

    /// Checks mission fields and mission references.
    fn ensure_missions_well_formed(&self) -> Result<(), CatalogError> {
        for mission in &self.missions {
            if mission.max_participants == 0 {
                return Err(CatalogError::InvalidMission {
                    mission_id: mission.mission_id.to_string(),
                    reason: "max_participants must be at least 1".to_string(),
                });
            }
            for required in &mission.requirements.required_missions {
                if self.mission(required).is_none() {
                    return Err(CatalogError::UnknownMissionReference {
                        from: mission.mission_id.to_string(),
                        missing: required.to_string(),
                    });
                }
            }
            for required in &mission.requirements.required_skills {
                if self.skill_node(required).is_none() {
                    return Err(CatalogError::UnknownSkillReference {
                        from: mission.mission_id.to_string(),
                        missing: required.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks that skill prerequisites, mission gates, and children resolve.
    fn ensure_skill_references_resolve(&self) -> Result<(), CatalogError> {
        for (tree, node) in self.skill_nodes() {
            for required in &node.requirements.required_skills {
                if self.skill_node(required).is_none() {
                    return Err(CatalogError::UnknownSkillReference {
                        from: node.node_id.to_string(),
                        missing: required.to_string(),
                    });
                }
            }
            for required in &node.requirements.missions_completed {
                if self.mission(required).is_none() {
                    return Err(CatalogError::UnknownMissionReference {
                        from: node.node_id.to_string(),
                        missing: required.to_string(),
                    });
                }
            }
            for child in &node.children {
                if tree.node(child).is_none() {
                    return Err(CatalogError::UnknownSkillReference {
                        from: node.node_id.to_string(),
                        missing: child.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks that `children` and same-tree `required_skills` describe the same edges.
    fn ensure_child_links_consistent(&self) -> Result<(), CatalogError> {
        for tree in &self.skill_trees {
            for parent in &tree.nodes {
                for child_id in &parent.children {
                    let requires_parent = tree
                        .node(child_id)
                        .is_some_and(|child| child.requirements.required_skills.contains(&parent.node_id));
                    if !requires_parent {
                        return Err(CatalogError::ChildLinkMismatch {
                            parent: parent.node_id.to_string(),
                            child: child_id.to_string(),
                        });
                    }
                }
            }
            for child in &tree.nodes {
                for parent_id in &child.requirements.required_skills {
                    if let Some(parent) = tree.node(parent_id)
                        && !parent.children.contains(&child.node_id)
                    {
                        return Err(CatalogError::ChildLinkMismatch {
                            parent: parent_id.to_string(),
                            child: child.node_id.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks that skill and mission prerequisite graphs are acyclic.
    fn ensure_acyclic(&self) -> Result<(), CatalogError> {
        let skill_edges: BTreeMap<&SkillNodeId, &[SkillNodeId]> = self
            .skill_nodes()
            .map(|(_, node)| (&node.node_id, node.requirements.required_skills.as_slice()))
            .collect();
        if let Some(node_id) = find_cycle(&skill_edges) {
            return Err(CatalogError::SkillCycle(node_id.to_string()));
        }
        let mission_edges: BTreeMap<&MissionId, &[MissionId]> = self
            .missions
            .iter()
            .map(|mission| {
                (&mission.mission_id, mission.requirements.required_missions.as_slice())
            })
            .collect();
        if let Some(mission_id) = find_cycle(&mission_edges) {
            return Err(CatalogError::MissionCycle(mission_id.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Duplicate mission identifier.
    #[error("duplicate mission identifier: {0}")]
    DuplicateMission(String),
    /// Duplicate skill tree identifier.
    #[error("duplicate skill tree identifier: {0}")]
    DuplicateSkillTree(String),
    /// Duplicate skill node identifier (node ids are catalog-wide).
    #[error("duplicate skill node identifier: {0}")]
    DuplicateSkillNode(String),
    /// Duplicate reward identifier.
    #[error("duplicate reward identifier: {0}")]
    DuplicateReward(String),
    /// Mission field is out of range.
    #[error("invalid mission {mission_id}: {reason}")]
    InvalidMission {
        /// Offending mission.
        mission_id: String,
        /// Violation description.
        reason: String,
    },
    /// Reference to a mission that is not in the catalog.
    #[error("{from} references unknown mission {missing}")]
    UnknownMissionReference {
        /// Referencing entry.
        from: String,
        /// Missing mission identifier.
        missing: String,
    },
    /// Reference to a skill node that is not in the catalog (or tree, for children).
    #[error("{from} references unknown skill node {missing}")]
    UnknownSkillReference {
        /// Referencing entry.
        from: String,
        /// Missing node identifier.
        missing: String,
    },
    /// `children` and `required_skills` disagree about a same-tree edge.
    #[error("skill link mismatch between parent {parent} and child {child}")]
    ChildLinkMismatch {
        /// Parent node identifier.
        parent: String,
        /// Child node identifier.
        child: String,
    },
    /// Skill prerequisite graph contains a cycle through the node.
    #[error("skill prerequisites form a cycle through {0}")]
    SkillCycle(String),
    /// Mission prerequisite graph contains a cycle through the mission.
    #[error("mission prerequisites form a cycle through {0}")]
    MissionCycle(String),
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures identifiers are unique, reporting the first duplicate.
fn ensure_unique<'a>(
    ids: impl Iterator<Item = &'a str>,
    error: impl Fn(String) -> CatalogError,
) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(error(id.to_string()));
        }
    }
    Ok(())
}

/// Depth-first visit marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// Node is on the current path.
    OnPath,
    /// Node and all its dependencies are cycle-free.
    Done,
}

/// Returns a node on a cycle, if any.
///
/// Iterative and bounded: each node is pushed at most once and each edge is
/// examined at most once. Edges to unknown nodes are treated as leaves.
fn find_cycle<'a, K: Ord>(edges: &BTreeMap<&'a K, &'a [K]>) -> Option<&'a K> {
    let mut visits: BTreeMap<&'a K, Visit> = BTreeMap::new();
    for &start in edges.keys() {
        if visits.contains_key(start) {
            continue;
        }
        visits.insert(start, Visit::OnPath);
        let mut stack: Vec<(&'a K, usize)> = vec![(start, 0)];
        while let Some(&(node, next)) = stack.last() {
            let deps = edges.get(node).copied().unwrap_or_default();
            let Some(dep) = deps.get(next) else {
                visits.insert(node, Visit::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 = next + 1;
            }
            match visits.get(dep) {
                Some(Visit::OnPath) => return Some(dep),
                Some(Visit::Done) => {}
                None => {
                    if edges.contains_key(dep) {
                        visits.insert(dep, Visit::OnPath);
                        stack.push((dep, 0));
                    } else {
                        visits.insert(dep, Visit::Done);
                    }
                }
            }
        }
    }
    None
}
