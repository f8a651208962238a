// crates/lifescore-core/tests/missions.rs
// ============================================================================
// Module: Mission Lifecycle Tests
// Description: Tests for start, progress, completion, and abandonment.
// Purpose: Validate the NONE -> ACTIVE -> COMPLETED machine and reward freezing.
// Dependencies: lifescore-core
// ============================================================================
//! ## Overview
//! Covers availability filtering, typed rejections, the atomic completion at
//! full progress, and the anti-double-reward guarantee.

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

use common::at;
use common::catalog;
use common::grant_skill;
use common::profile;
use lifescore_core::MissionError;
use lifescore_core::MissionId;
use lifescore_core::MissionStatus;
use lifescore_core::UnmetRequirement;
use lifescore_core::runtime::missions;

fn id(value: &str) -> MissionId {
    MissionId::new(value)
}

fn available_ids(catalog: &lifescore_core::Catalog, profile: &lifescore_core::UserProfile) -> Vec<String> {
    missions::list_available(catalog, profile).map(|mission| mission.mission_id.to_string()).collect()
}

/// Verifies availability preserves catalog order and filters solo requirements.
#[test]
fn list_available_preserves_catalog_order() {
    let catalog = catalog();
    let profile = profile(0, 0, 0);
    assert_eq!(
        available_ids(&catalog, &profile),
        vec!["safe_commute", "morning_walk", "family_challenge"]
    );
}

/// Verifies collaborative missions ignore their advisory requirements.
#[test]
fn collaborative_missions_ignore_requirements() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    let record = missions::start(&catalog, &mut profile, &id("family_challenge"), at(1)).unwrap();
    assert_eq!(record.status, MissionStatus::Active);
}

#[test]
fn list_available_excludes_started_and_completed() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    missions::start(&catalog, &mut profile, &id("morning_walk"), at(1)).unwrap();
    missions::complete(&catalog, &mut profile, &id("morning_walk"), at(2)).unwrap();
    assert_eq!(available_ids(&catalog, &profile), vec!["family_challenge"]);
}

#[test]
fn list_available_includes_missions_once_requirements_hold() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    missions::complete(&catalog, &mut profile, &id("safe_commute"), at(2)).unwrap();
    grant_skill(&mut profile, "driving", "defensive_driving");
    let ids = available_ids(&catalog, &profile);
    assert_eq!(ids, vec!["morning_walk", "night_driver", "family_challenge", "budget_sprint"]);
}

/// Verifies rewards above `i64::MAX` are credited exactly as recorded.
#[test]
fn completion_credits_rewards_beyond_signed_range() {
    let mut catalog = catalog();
    let amount = u64::MAX - 3;
    let mission = catalog
        .missions
        .iter_mut()
        .find(|mission| mission.mission_id == id("morning_walk"))
        .unwrap();
    mission.xp_reward = amount;
    mission.coin_reward = amount;
    let mut profile = profile(2, 0, 1);
    missions::start(&catalog, &mut profile, &id("morning_walk"), at(1)).unwrap();
    let completion =
        missions::complete(&catalog, &mut profile, &id("morning_walk"), at(2)).unwrap();
    assert_eq!(completion.mission.xp_earned, amount);
    assert_eq!(completion.mission.coins_earned, amount);
    assert_eq!(profile.progression.xp(), u64::MAX - 1);
    assert_eq!(profile.progression.coins(), u64::MAX - 2);
}

/// Verifies the start record is active, empty, and free of charge.
#[test]
fn start_creates_active_record_without_touching_progression() {
    let catalog = catalog();
    let mut profile = profile(10, 20, 30);
    let before = profile.progression;
    let record = missions::start(&catalog, &mut profile, &id("safe_commute"), at(5)).unwrap();
    assert_eq!(record.status, MissionStatus::Active);
    assert_eq!(record.progress, 0);
    assert_eq!(record.started_at, at(5));
    assert_eq!(record.xp_earned, 0);
    assert_eq!(record.lifescore_change, 0);
    assert_eq!(profile.progression, before);
}

#[test]
fn start_rejects_active_and_completed_missions() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    assert_eq!(
        missions::start(&catalog, &mut profile, &id("safe_commute"), at(2)).unwrap_err(),
        MissionError::AlreadyActiveOrCompleted(id("safe_commute"))
    );
    missions::complete(&catalog, &mut profile, &id("safe_commute"), at(3)).unwrap();
    assert_eq!(
        missions::start(&catalog, &mut profile, &id("safe_commute"), at(4)).unwrap_err(),
        MissionError::AlreadyActiveOrCompleted(id("safe_commute"))
    );
}

#[test]
fn start_rejects_unknown_mission() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    assert_eq!(
        missions::start(&catalog, &mut profile, &id("moon_landing"), at(1)).unwrap_err(),
        MissionError::UnknownMission(id("moon_landing"))
    );
}

/// Verifies unmet solo requirements are reported individually.
#[test]
fn start_rejects_unmet_solo_requirements() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    let err = missions::start(&catalog, &mut profile, &id("night_driver"), at(1)).unwrap_err();
    assert_eq!(
        err,
        MissionError::RequirementsNotMet {
            mission_id: id("night_driver"),
            unmet: vec![
                UnmetRequirement::MinLevel {
                    required: 3,
                    actual: 1,
                },
                UnmetRequirement::MissingMission {
                    mission_id: id("safe_commute"),
                },
            ],
        }
    );
    assert!(profile.missions.is_empty());
}

/// Verifies the documented 250 XP completion scenario and the second-call rejection.
#[test]
fn completing_reward_mission_reaches_level_three_once() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    let completion = missions::complete(&catalog, &mut profile, &id("safe_commute"), at(2)).unwrap();
    assert_eq!(profile.progression.xp(), 250);
    assert_eq!(profile.progression.level(), 3);
    assert_eq!(completion.delta.xp, 250);
    assert!(completion.delta.leveled_up());

    let err = missions::complete(&catalog, &mut profile, &id("safe_commute"), at(3)).unwrap_err();
    assert_eq!(err, MissionError::AlreadyCompleted(id("safe_commute")));
    assert_eq!(profile.progression.xp(), 250);
    assert_eq!(profile.mission(&id("safe_commute")).unwrap().xp_earned, 250);
}

#[test]
fn completion_freezes_all_rewards() {
    let catalog = catalog();
    let mut profile = profile(0, 100, 5);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    let completion = missions::complete(&catalog, &mut profile, &id("safe_commute"), at(9)).unwrap();
    let record = completion.mission;
    assert_eq!(record.status, MissionStatus::Completed);
    assert_eq!(record.progress, 100);
    assert_eq!(record.completed_at, Some(at(9)));
    assert_eq!(record.xp_earned, 250);
    assert_eq!(record.lifescore_change, 15);
    assert_eq!(record.coins_earned, 50);
    assert_eq!(profile.progression.lifescore(), 115);
    assert_eq!(profile.progression.coins(), 55);
}

/// Verifies frozen rewards survive a later catalog change.
#[test]
fn frozen_rewards_ignore_catalog_changes() {
    let mut catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    missions::complete(&catalog, &mut profile, &id("safe_commute"), at(2)).unwrap();
    catalog.missions[0].xp_reward = 9_999;
    assert_eq!(profile.mission(&id("safe_commute")).unwrap().xp_earned, 250);
}

#[test]
fn complete_without_record_is_not_active() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    assert_eq!(
        missions::complete(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap_err(),
        MissionError::NotActive(id("safe_commute"))
    );
}

/// Verifies partial progress is clamped and stays active.
#[test]
fn update_progress_clamps_and_keeps_active() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    let update =
        missions::update_progress(&catalog, &mut profile, &id("safe_commute"), 40, at(2)).unwrap();
    assert_eq!(update.mission.progress, 40);
    assert!(update.completion.is_none());
    let lowered =
        missions::update_progress(&catalog, &mut profile, &id("safe_commute"), -10, at(3)).unwrap();
    assert_eq!(lowered.mission.progress, 0);
    assert_eq!(lowered.mission.updated_at, at(3));
}

/// Verifies progress at or above 100 completes atomically.
#[test]
fn update_progress_to_full_completes_mission() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    let update =
        missions::update_progress(&catalog, &mut profile, &id("safe_commute"), 250, at(2)).unwrap();
    let completion = update.completion.expect("completion triggered");
    assert_eq!(completion.mission.status, MissionStatus::Completed);
    assert_eq!(update.mission.status, MissionStatus::Completed);
    assert_eq!(profile.progression.xp(), 250);
    let stored = profile.mission(&id("safe_commute")).unwrap();
    assert!(!(stored.progress == 100 && stored.is_active()));
}

#[test]
fn update_progress_on_completed_mission_is_rejected() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    missions::complete(&catalog, &mut profile, &id("safe_commute"), at(2)).unwrap();
    assert_eq!(
        missions::update_progress(&catalog, &mut profile, &id("safe_commute"), 100, at(3))
            .unwrap_err(),
        MissionError::AlreadyCompleted(id("safe_commute"))
    );
    assert_eq!(profile.progression.xp(), 250);
}

#[test]
fn update_progress_without_record_is_not_active() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    assert_eq!(
        missions::update_progress(&catalog, &mut profile, &id("morning_walk"), 10, at(1))
            .unwrap_err(),
        MissionError::NotActive(id("morning_walk"))
    );
}

/// Verifies abandonment deletes the record and re-offers the mission.
#[test]
fn abandon_makes_mission_available_again() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("morning_walk"), at(1)).unwrap();
    let removed = missions::abandon(&mut profile, &id("morning_walk")).unwrap();
    assert_eq!(removed.mission_id, id("morning_walk"));
    assert!(profile.mission(&id("morning_walk")).is_none());
    assert!(available_ids(&catalog, &profile).contains(&"morning_walk".to_string()));
    missions::start(&catalog, &mut profile, &id("morning_walk"), at(2)).unwrap();
}

#[test]
fn abandon_rejects_completed_and_missing_records() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    assert_eq!(
        missions::abandon(&mut profile, &id("morning_walk")).unwrap_err(),
        MissionError::NotActive(id("morning_walk"))
    );
    missions::start(&catalog, &mut profile, &id("morning_walk"), at(1)).unwrap();
    missions::complete(&catalog, &mut profile, &id("morning_walk"), at(2)).unwrap();
    assert_eq!(
        missions::abandon(&mut profile, &id("morning_walk")).unwrap_err(),
        MissionError::AlreadyCompleted(id("morning_walk"))
    );
}

#[test]
fn active_and_completed_views_follow_catalog_order() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    missions::start(&catalog, &mut profile, &id("family_challenge"), at(1)).unwrap();
    missions::start(&catalog, &mut profile, &id("morning_walk"), at(1)).unwrap();
    missions::start(&catalog, &mut profile, &id("safe_commute"), at(1)).unwrap();
    missions::complete(&catalog, &mut profile, &id("morning_walk"), at(2)).unwrap();
    let active: Vec<_> =
        missions::list_active(&catalog, &profile).map(|(m, _)| m.mission_id.to_string()).collect();
    let completed: Vec<_> = missions::list_completed(&catalog, &profile)
        .map(|(m, _)| m.mission_id.to_string())
        .collect();
    assert_eq!(active, vec!["safe_commute", "family_challenge"]);
    assert_eq!(completed, vec!["morning_walk"]);
}
