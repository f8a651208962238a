// crates/lifescore-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for lifescore-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use lifescore_config::ConfigError;
use lifescore_config::LifeScoreConfig;

/// Result type used by config test suites.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `LifeScoreConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<LifeScoreConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config naming only the catalog.
pub fn minimal_config() -> Result<LifeScoreConfig, toml::de::Error> {
    config_from_toml("[catalog]\npath = \"catalog.json\"\n")
}

/// Checks that validation failed with a message containing `needle`.
pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

/// A small valid catalog document.
pub const CATALOG_JSON: &str = r#"{
  "missions": [
    {
      "mission_id": "safe_commute",
      "title": "Safe commute",
      "category": "safe_driving",
      "difficulty": "easy",
      "xp_reward": 250,
      "coin_reward": 50,
      "lifescore_impact": 15,
      "duration_days": 7
    }
  ],
  "skill_trees": [
    {
      "tree_id": "driving",
      "title": "Driving",
      "category": "safe_driving",
      "nodes": [
        {"node_id": "defensive_driving", "xp_cost": 50, "children": ["advanced_defense"]},
        {
          "node_id": "advanced_defense",
          "xp_cost": 100,
          "requirements": {"min_level": 2, "required_skills": ["defensive_driving"]}
        }
      ]
    }
  ],
  "rewards": [
    {"reward_id": "partner_discount", "reward_type": "partner_offer", "coins_cost": 100}
  ]
}"#;
