// crates/lifescore-core/src/runtime/rewards.rs
// ============================================================================
// Module: LifeScore Reward Redemption
// Description: Coin purchases and free grants against the reward ledger.
// Purpose: Enforce single ownership and the non-negative coin balance.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! A user holds each reward at most once. [`redeem`] buys a purchasable
//! reward and checks the balance before touching it; [`earn`] grants a
//! reward for free. Both append one ledger entry on success and nothing on
//! failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Catalog;
use crate::core::ProgressionDelta;
use crate::core::ProgressionState;
use crate::core::Reward;
use crate::core::RewardAcquisition;
use crate::core::RewardId;
use crate::core::Timestamp;
use crate::core::UserProfile;
use crate::core::UserReward;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a redeem or earn transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    /// Appended ledger entry.
    pub reward: UserReward,
    /// Progression change (coins spent, if any).
    pub delta: ProgressionDelta,
}

/// Reward rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardError {
    /// Reward is not in the catalog.
    #[error("reward not found: {0}")]
    NotFound(RewardId),
    /// Reward is already in the ledger.
    #[error("reward {0} is already owned")]
    AlreadyOwned(RewardId),
    /// Coin balance is below the price.
    #[error("reward {reward_id} costs {required} coins but only {available} are available")]
    InsufficientCoins {
        /// Reward identifier.
        reward_id: RewardId,
        /// Price.
        required: u64,
        /// Current balance.
        available: u64,
    },
    /// Reward has no price and can only be earned.
    #[error("reward {0} cannot be purchased")]
    NotPurchasable(RewardId),
}

impl RewardError {
    /// Returns a stable snake_case label for the rejection.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyOwned(_) => "already_owned",
            Self::InsufficientCoins {
                ..
            } => "insufficient_coins",
            Self::NotPurchasable(_) => "not_purchasable",
        }
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Lists owned rewards in ledger order, paired with their catalog entries.
///
/// Ledger entries whose reward left the catalog are skipped.
pub fn list_owned<'a>(
    catalog: &'a Catalog,
    profile: &'a UserProfile,
) -> impl Iterator<Item = (&'a Reward, &'a UserReward)> + 'a {
    profile
        .rewards
        .iter()
        .filter_map(|entry| catalog.reward(&entry.reward_id).map(|reward| (reward, entry)))
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

/// Buys a reward with coins.
///
/// # Errors
///
/// Returns [`RewardError`] when the reward is unknown, free, already owned,
/// or unaffordable. The balance is unchanged on every error.
pub fn redeem(
    catalog: &Catalog,
    profile: &mut UserProfile,
    reward_id: &RewardId,
    context: &str,
    at: Timestamp,
) -> Result<RewardGrant, RewardError> {
    let reward = lookup(catalog, reward_id)?;
    ensure_not_owned(profile, reward_id)?;
    if !reward.is_purchasable() {
        return Err(RewardError::NotPurchasable(reward_id.clone()));
    }
    let available = profile.progression.coins();
    if available < reward.coins_cost {
        return Err(RewardError::InsufficientCoins {
            reward_id: reward_id.clone(),
            required: reward.coins_cost,
            available,
        });
    }
    let after = profile.progression.spend_coins(reward.coins_cost);
    Ok(append(profile, after, reward, RewardAcquisition::Purchased, context, at))
}

/// Grants a reward without payment.
///
/// # Errors
///
/// Returns [`RewardError`] when the reward is unknown or already owned.
pub fn earn(
    catalog: &Catalog,
    profile: &mut UserProfile,
    reward_id: &RewardId,
    context: &str,
    at: Timestamp,
) -> Result<RewardGrant, RewardError> {
    let reward = lookup(catalog, reward_id)?;
    ensure_not_owned(profile, reward_id)?;
    let after = profile.progression;
    Ok(append(profile, after, reward, RewardAcquisition::Earned, context, at))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves a catalog reward.
fn lookup<'a>(catalog: &'a Catalog, reward_id: &RewardId) -> Result<&'a Reward, RewardError> {
    catalog.reward(reward_id).ok_or_else(|| RewardError::NotFound(reward_id.clone()))
}

/// Rejects rewards already in the ledger.
fn ensure_not_owned(profile: &UserProfile, reward_id: &RewardId) -> Result<(), RewardError> {
    if profile.owns_reward(reward_id) {
        return Err(RewardError::AlreadyOwned(reward_id.clone()));
    }
    Ok(())
}

/// Commits the new balance and appends the ledger entry.
fn append(
    profile: &mut UserProfile,
    after: ProgressionState,
    reward: &Reward,
    acquisition: RewardAcquisition,
    context: &str,
    at: Timestamp,
) -> RewardGrant {
    let coins_spent = match acquisition {
        RewardAcquisition::Purchased => reward.coins_cost,
        RewardAcquisition::Earned => 0,
    };
    let entry = UserReward {
        reward_id: reward.reward_id.clone(),
        acquisition,
        coins_spent,
        context: context.to_string(),
        acquired_at: at,
    };
    let before = profile.progression;
    profile.progression = after;
    profile.rewards.push(entry.clone());
    RewardGrant {
        reward: entry,
        delta: ProgressionDelta::between(&before, &after),
    }
}
