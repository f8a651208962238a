// crates/lifescore-core/tests/catalog_validation.rs
// ============================================================================
// Module: Catalog Validation Tests
// Description: Tests for load-time catalog invariants.
// Purpose: Ensure malformed catalogs fail closed before any command runs.
// Dependencies: lifescore-core, serde_json
// ============================================================================
//! ## Overview
//! Covers duplicate identifiers, dangling references, disagreement between
//! `children` and `required_skills`, and prerequisite cycles.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::catalog;
use common::mission;
use common::node;
use lifescore_core::Catalog;
use lifescore_core::CatalogError;
use lifescore_core::Difficulty;
use lifescore_core::MissionId;
use lifescore_core::SkillNodeId;

#[test]
fn fixture_catalog_is_valid() {
    catalog().validate().unwrap();
}

#[test]
fn empty_catalog_is_valid() {
    Catalog::default().validate().unwrap();
}

#[test]
fn duplicate_mission_is_rejected() {
    let mut catalog = catalog();
    catalog.missions.push(mission("safe_commute", 1, 0, 0));
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::DuplicateMission("safe_commute".to_string())
    );
}

/// Verifies node identifiers are unique across trees.
#[test]
fn duplicate_node_across_trees_is_rejected() {
    let mut catalog = catalog();
    catalog.skill_trees[1].nodes.push(node("eco_driving", 0));
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::DuplicateSkillNode("eco_driving".to_string())
    );
}

#[test]
fn duplicate_tree_and_reward_are_rejected() {
    let mut trees = catalog();
    let copy = trees.skill_trees[1].clone();
    trees.skill_trees.push(copy);
    assert_eq!(
        trees.validate().unwrap_err(),
        CatalogError::DuplicateSkillTree("wellness".to_string())
    );

    let mut rewards = catalog();
    let copy = rewards.rewards[0].clone();
    rewards.rewards.push(copy);
    assert_eq!(
        rewards.validate().unwrap_err(),
        CatalogError::DuplicateReward("partner_discount".to_string())
    );
}

#[test]
fn zero_participants_is_rejected() {
    let mut catalog = catalog();
    catalog.missions[0].max_participants = 0;
    assert!(matches!(catalog.validate().unwrap_err(), CatalogError::InvalidMission { .. }));
}

#[test]
fn dangling_mission_reference_is_rejected() {
    let mut catalog = catalog();
    catalog.missions[0].requirements.required_missions = vec![MissionId::new("ghost")];
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::UnknownMissionReference {
            from: "safe_commute".to_string(),
            missing: "ghost".to_string(),
        }
    );
}

#[test]
fn dangling_skill_reference_is_rejected() {
    let mut catalog = catalog();
    catalog.skill_trees[1].nodes[0].requirements.required_skills = vec![SkillNodeId::new("ghost")];
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::UnknownSkillReference {
            from: "mindful_breathing".to_string(),
            missing: "ghost".to_string(),
        }
    );
}

/// Verifies children must live in the same tree.
#[test]
fn child_outside_tree_is_rejected() {
    let mut catalog = catalog();
    catalog.skill_trees[1].nodes[0].children = vec![SkillNodeId::new("eco_driving")];
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::UnknownSkillReference {
            from: "mindful_breathing".to_string(),
            missing: "eco_driving".to_string(),
        }
    );
}

/// Verifies a child pointer without the matching prerequisite is rejected.
#[test]
fn child_without_back_reference_is_rejected() {
    let mut catalog = catalog();
    catalog.skill_trees[0].nodes[0].children.push(SkillNodeId::new("eco_driving"));
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::ChildLinkMismatch {
            parent: "defensive_driving".to_string(),
            child: "eco_driving".to_string(),
        }
    );
}

/// Verifies a same-tree prerequisite without the matching child pointer is rejected.
#[test]
fn prerequisite_without_child_pointer_is_rejected() {
    let mut catalog = catalog();
    catalog.skill_trees[0].nodes[2].requirements.required_skills =
        vec![SkillNodeId::new("defensive_driving")];
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::ChildLinkMismatch {
            parent: "defensive_driving".to_string(),
            child: "eco_driving".to_string(),
        }
    );
}

/// Verifies cross-tree prerequisites need no child pointer.
#[test]
fn cross_tree_prerequisite_is_allowed() {
    let mut catalog = catalog();
    catalog.skill_trees[1].nodes[0].requirements.required_skills =
        vec![SkillNodeId::new("defensive_driving")];
    catalog.validate().unwrap();
}

#[test]
fn skill_cycle_is_rejected() {
    let mut catalog = catalog();
    let tree = &mut catalog.skill_trees[0];
    tree.nodes[0].requirements.required_skills = vec![SkillNodeId::new("advanced_defense")];
    tree.nodes[1].children = vec![SkillNodeId::new("defensive_driving")];
    assert!(matches!(catalog.validate().unwrap_err(), CatalogError::SkillCycle(_)));
}

/// Verifies a cycle spanning two trees is detected.
#[test]
fn cross_tree_skill_cycle_is_rejected() {
    let mut catalog = catalog();
    catalog.skill_trees[0].nodes[0].requirements.required_skills =
        vec![SkillNodeId::new("mindful_breathing")];
    catalog.skill_trees[1].nodes[0].requirements.required_skills =
        vec![SkillNodeId::new("advanced_defense")];
    assert!(matches!(catalog.validate().unwrap_err(), CatalogError::SkillCycle(_)));
}

#[test]
fn self_requirement_is_a_cycle() {
    let mut catalog = catalog();
    catalog.missions[1].requirements.required_missions = vec![MissionId::new("morning_walk")];
    assert_eq!(
        catalog.validate().unwrap_err(),
        CatalogError::MissionCycle("morning_walk".to_string())
    );
}

#[test]
fn mission_cycle_is_rejected() {
    let mut catalog = catalog();
    catalog.missions[0].requirements.required_missions = vec![MissionId::new("night_driver")];
    assert!(matches!(catalog.validate().unwrap_err(), CatalogError::MissionCycle(_)));
}

/// Verifies a long prerequisite chain validates without recursion.
#[test]
fn long_chain_validates() {
    let missions = (0..10_000)
        .map(|index| {
            let mut entry = mission(&format!("m{index}"), 1, 0, 0);
            if index > 0 {
                entry.requirements.required_missions = vec![MissionId::new(format!("m{}", index - 1))];
            }
            entry
        })
        .collect();
    let catalog = Catalog {
        missions,
        ..Catalog::default()
    };
    catalog.validate().unwrap();
}

#[test]
fn expert_difficulty_alias_parses_as_epic() {
    let difficulty: Difficulty = serde_json::from_str("\"expert\"").unwrap();
    assert_eq!(difficulty, Difficulty::Epic);
    assert_eq!(serde_json::to_string(&Difficulty::Epic).unwrap(), "\"epic\"");
}

/// Verifies optional catalog fields take their defaults.
#[test]
fn catalog_json_defaults_optional_fields() {
    let json = r#"{
        "missions": [{
            "mission_id": "walk",
            "category": "health",
            "difficulty": "easy",
            "xp_reward": 10,
            "duration_days": 1
        }],
        "skill_trees": [{
            "tree_id": "t",
            "category": "lifestyle",
            "nodes": [{"node_id": "n", "xp_cost": 5}]
        }],
        "rewards": [{"reward_id": "r", "reward_type": "achievement"}]
    }"#;
    let catalog: Catalog = serde_json::from_str(json).unwrap();
    catalog.validate().unwrap();
    let walk = &catalog.missions[0];
    assert_eq!(walk.max_participants, 1);
    assert_eq!(walk.coin_reward, 0);
    assert!(walk.enforces_requirements());
    assert!(!catalog.rewards[0].is_purchasable());
}

#[test]
fn fingerprint_is_stable_and_content_sensitive() {
    let first = catalog().fingerprint().unwrap();
    let second = catalog().fingerprint().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.value.len(), 64);
    let mut changed = catalog();
    changed.missions[0].xp_reward += 1;
    assert_ne!(changed.fingerprint().unwrap(), first);
}
