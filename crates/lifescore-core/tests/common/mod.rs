// crates/lifescore-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared catalog, profile, and engine fixtures.
// Purpose: Reduce duplication across lifescore-core integration tests.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;
use std::sync::Mutex;

use lifescore_core::AuditSink;
use lifescore_core::BadgeRarity;
use lifescore_core::Catalog;
use lifescore_core::Difficulty;
use lifescore_core::EngineConfig;
use lifescore_core::InMemoryProfileStore;
use lifescore_core::Mission;
use lifescore_core::MissionCategory;
use lifescore_core::MissionId;
use lifescore_core::MissionRequirements;
use lifescore_core::ProgressionAuditEvent;
use lifescore_core::ProgressionEngine;
use lifescore_core::ProgressionState;
use lifescore_core::Reward;
use lifescore_core::RewardId;
use lifescore_core::RewardType;
use lifescore_core::SkillBonus;
use lifescore_core::SkillNode;
use lifescore_core::SkillNodeId;
use lifescore_core::SkillRequirements;
use lifescore_core::SkillTree;
use lifescore_core::SkillTreeId;
use lifescore_core::Timestamp;
use lifescore_core::UserId;
use lifescore_core::UserProfile;
use lifescore_core::UserSkill;

/// Builds a solo mission with no requirements.
pub fn mission(id: &str, xp_reward: u64, coin_reward: u64, lifescore_impact: i64) -> Mission {
    Mission {
        mission_id: MissionId::new(id),
        title: id.replace('_', " "),
        category: MissionCategory::SafeDriving,
        difficulty: Difficulty::Easy,
        xp_reward,
        coin_reward,
        lifescore_impact,
        is_collaborative: false,
        max_participants: 1,
        duration_days: 7,
        requirements: MissionRequirements::default(),
    }
}

/// Builds a skill node with no requirements, children, or bonus.
pub fn node(id: &str, xp_cost: u64) -> SkillNode {
    SkillNode {
        node_id: SkillNodeId::new(id),
        title: id.replace('_', " "),
        xp_cost,
        requirements: SkillRequirements::default(),
        children: Vec::new(),
        bonus: SkillBonus::default(),
    }
}

/// Builds a reward entry.
pub fn reward(id: &str, reward_type: RewardType, coins_cost: u64) -> Reward {
    Reward {
        reward_id: RewardId::new(id),
        title: id.replace('_', " "),
        reward_type,
        coins_cost,
        badge_rarity: None,
    }
}

/// Returns the shared test catalog.
pub fn catalog() -> Catalog {
    let mut night_driver = mission("night_driver", 300, 80, 20);
    night_driver.difficulty = Difficulty::Hard;
    night_driver.requirements = MissionRequirements {
        min_level: Some(3),
        required_missions: vec![MissionId::new("safe_commute")],
        required_skills: Vec::new(),
    };

    let mut family_challenge = mission("family_challenge", 120, 30, 10);
    family_challenge.category = MissionCategory::FamilyProtection;
    family_challenge.is_collaborative = true;
    family_challenge.max_participants = 4;
    family_challenge.requirements.min_level = Some(5);

    let mut budget_sprint = mission("budget_sprint", 100, 40, 8);
    budget_sprint.category = MissionCategory::FinancialGuardian;
    budget_sprint.requirements.required_skills = vec![SkillNodeId::new("defensive_driving")];

    let mut morning_walk = mission("morning_walk", 40, 10, 5);
    morning_walk.category = MissionCategory::Health;

    let mut defensive_driving = node("defensive_driving", 50);
    defensive_driving.children = vec![SkillNodeId::new("advanced_defense")];
    defensive_driving.bonus.lifescore = 10;

    let mut advanced_defense = node("advanced_defense", 100);
    advanced_defense.requirements.min_level = Some(2);
    advanced_defense.requirements.required_skills = vec![SkillNodeId::new("defensive_driving")];
    advanced_defense.bonus.lifescore = 20;

    let mut eco_driving = node("eco_driving", 30);
    eco_driving.requirements.xp_required = Some(200);
    eco_driving.requirements.lifescore_threshold = Some(100);
    eco_driving.requirements.missions_completed = vec![MissionId::new("safe_commute")];
    eco_driving.bonus.xp = 20;

    let mut first_steps = reward("first_steps", RewardType::Badge, 0);
    first_steps.badge_rarity = Some(BadgeRarity::Common);

    Catalog {
        missions: vec![
            mission("safe_commute", 250, 50, 15),
            morning_walk,
            night_driver,
            family_challenge,
            budget_sprint,
        ],
        skill_trees: vec![
            SkillTree {
                tree_id: SkillTreeId::new("driving"),
                title: "Driving".to_string(),
                category: MissionCategory::SafeDriving,
                nodes: vec![defensive_driving, advanced_defense, eco_driving],
            },
            SkillTree {
                tree_id: SkillTreeId::new("wellness"),
                title: "Wellness".to_string(),
                category: MissionCategory::Health,
                nodes: vec![node("mindful_breathing", 0)],
            },
        ],
        rewards: vec![
            reward("partner_discount", RewardType::PartnerOffer, 100),
            reward("coffee_voucher", RewardType::PartnerOffer, 40),
            first_steps,
        ],
    }
}

/// Returns the default test user.
pub fn user() -> UserId {
    UserId::new("user-1")
}

/// Returns a logical timestamp.
pub const fn at(tick: u64) -> Timestamp {
    Timestamp::Logical(tick)
}

/// Builds a profile with the given progression values.
pub fn profile(xp: u64, lifescore: u32, coins: u64) -> UserProfile {
    let state = ProgressionState::new(xp, lifescore, coins, 0).expect("valid progression");
    UserProfile::new(user(), state)
}

/// Marks a skill node as unlocked without running the resolver.
pub fn grant_skill(profile: &mut UserProfile, tree: &str, node: &str) {
    profile.skills.push(UserSkill {
        tree_id: SkillTreeId::new(tree),
        node_id: SkillNodeId::new(node),
        unlocked: true,
        progress: 100,
        unlocked_at: Some(at(0)),
    });
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<ProgressionAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<ProgressionAuditEvent> {
        self.events.lock().expect("audit lock").clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &ProgressionAuditEvent) {
        self.events.lock().expect("audit lock").push(event.clone());
    }
}

/// Builds an engine over an in-memory store with a recording audit sink.
pub fn engine() -> (ProgressionEngine<InMemoryProfileStore>, Arc<RecordingAuditSink>) {
    engine_with_config(EngineConfig::default())
}

/// Builds an engine with an explicit configuration.
pub fn engine_with_config(
    config: EngineConfig,
) -> (ProgressionEngine<InMemoryProfileStore>, Arc<RecordingAuditSink>) {
    let audit = Arc::new(RecordingAuditSink::default());
    let engine =
        ProgressionEngine::new(catalog(), InMemoryProfileStore::new(), audit.clone(), config)
            .expect("valid catalog");
    (engine, audit)
}
