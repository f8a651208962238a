// crates/lifescore-core/tests/rewards.rs
// ============================================================================
// Module: Reward Redemption Tests
// Description: Tests for coin purchases and free grants.
// Purpose: Validate ownership guards and the non-negative coin balance.
// Dependencies: lifescore-core
// ============================================================================
//! ## Overview
//! Ensures purchases check the balance before deducting, grants never charge,
//! and the ledger never holds the same reward twice.

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
use common::profile;
use lifescore_core::RewardAcquisition;
use lifescore_core::RewardError;
use lifescore_core::RewardId;
use lifescore_core::runtime::rewards;

fn id(value: &str) -> RewardId {
    RewardId::new(value)
}

/// Verifies the documented 100-coin reward against a 50-coin balance.
#[test]
fn insufficient_coins_leaves_balance_unchanged() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 50);
    let err = rewards::redeem(&catalog, &mut profile, &id("partner_discount"), "shop", at(1))
        .unwrap_err();
    assert_eq!(
        err,
        RewardError::InsufficientCoins {
            reward_id: id("partner_discount"),
            required: 100,
            available: 50,
        }
    );
    assert_eq!(profile.progression.coins(), 50);
    assert!(profile.rewards.is_empty());
}

#[test]
fn redeem_deducts_price_and_appends_ledger_entry() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 120);
    let grant =
        rewards::redeem(&catalog, &mut profile, &id("partner_discount"), "shop", at(4)).unwrap();
    assert_eq!(profile.progression.coins(), 20);
    assert_eq!(grant.delta.coins, -100);
    assert_eq!(grant.reward.acquisition, RewardAcquisition::Purchased);
    assert_eq!(grant.reward.coins_spent, 100);
    assert_eq!(grant.reward.context, "shop");
    assert_eq!(grant.reward.acquired_at, at(4));
    assert_eq!(profile.rewards, vec![grant.reward]);
}

#[test]
fn exact_balance_is_sufficient() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 40);
    rewards::redeem(&catalog, &mut profile, &id("coffee_voucher"), "shop", at(1)).unwrap();
    assert_eq!(profile.progression.coins(), 0);
}

/// Verifies prices above `i64::MAX` are deducted in full and match the ledger.
#[test]
fn redeem_deducts_prices_beyond_signed_range() {
    let mut catalog = catalog();
    let price = u64::MAX - 10;
    catalog
        .rewards
        .iter_mut()
        .find(|reward| reward.reward_id == id("partner_discount"))
        .unwrap()
        .coins_cost = price;
    let mut profile = profile(0, 0, u64::MAX);
    let grant =
        rewards::redeem(&catalog, &mut profile, &id("partner_discount"), "shop", at(1)).unwrap();
    assert_eq!(profile.progression.coins(), 10);
    assert_eq!(grant.reward.coins_spent, price);
    assert_eq!(u64::MAX - profile.progression.coins(), grant.reward.coins_spent);
}

/// Verifies a maximal price drains a maximal balance to zero.
#[test]
fn redeem_maximal_price_empties_balance() {
    let mut catalog = catalog();
    catalog
        .rewards
        .iter_mut()
        .find(|reward| reward.reward_id == id("coffee_voucher"))
        .unwrap()
        .coins_cost = u64::MAX;
    let mut profile = profile(0, 0, u64::MAX);
    let grant =
        rewards::redeem(&catalog, &mut profile, &id("coffee_voucher"), "shop", at(1)).unwrap();
    assert_eq!(profile.progression.coins(), 0);
    assert_eq!(grant.reward.coins_spent, u64::MAX);
}

#[test]
fn redeem_rejects_owned_reward() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 500);
    rewards::redeem(&catalog, &mut profile, &id("coffee_voucher"), "shop", at(1)).unwrap();
    let err =
        rewards::redeem(&catalog, &mut profile, &id("coffee_voucher"), "shop", at(2)).unwrap_err();
    assert_eq!(err, RewardError::AlreadyOwned(id("coffee_voucher")));
    assert_eq!(profile.progression.coins(), 460);
    assert_eq!(profile.rewards.len(), 1);
}

#[test]
fn redeem_rejects_unknown_reward() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 500);
    assert_eq!(
        rewards::redeem(&catalog, &mut profile, &id("yacht"), "shop", at(1)).unwrap_err(),
        RewardError::NotFound(id("yacht"))
    );
}

/// Verifies free rewards can only enter the ledger through earn.
#[test]
fn redeem_rejects_free_reward() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 500);
    assert_eq!(
        rewards::redeem(&catalog, &mut profile, &id("first_steps"), "shop", at(1)).unwrap_err(),
        RewardError::NotPurchasable(id("first_steps"))
    );
    assert!(profile.rewards.is_empty());
}

#[test]
fn earn_grants_without_charging() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 0);
    let grant =
        rewards::earn(&catalog, &mut profile, &id("first_steps"), "mission:safe_commute", at(3))
            .unwrap();
    assert_eq!(grant.reward.acquisition, RewardAcquisition::Earned);
    assert_eq!(grant.reward.coins_spent, 0);
    assert_eq!(grant.delta.coins, 0);
    assert!(profile.owns_reward(&id("first_steps")));
}

#[test]
fn earn_enforces_single_ownership() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 100);
    rewards::redeem(&catalog, &mut profile, &id("coffee_voucher"), "shop", at(1)).unwrap();
    assert_eq!(
        rewards::earn(&catalog, &mut profile, &id("coffee_voucher"), "promo", at(2)).unwrap_err(),
        RewardError::AlreadyOwned(id("coffee_voucher"))
    );
}

#[test]
fn list_owned_follows_ledger_order() {
    let catalog = catalog();
    let mut profile = profile(0, 0, 200);
    rewards::earn(&catalog, &mut profile, &id("first_steps"), "onboarding", at(1)).unwrap();
    rewards::redeem(&catalog, &mut profile, &id("coffee_voucher"), "shop", at(2)).unwrap();
    let owned: Vec<_> = rewards::list_owned(&catalog, &profile)
        .map(|(reward, _)| reward.reward_id.to_string())
        .collect();
    assert_eq!(owned, vec!["first_steps", "coffee_voucher"]);
}
