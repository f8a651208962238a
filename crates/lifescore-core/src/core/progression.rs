// crates/lifescore-core/src/core/progression.rs
// ============================================================================
// Module: LifeScore Progression State
// Description: Per-user XP, level, LifeScore, coin, and streak record.
// Purpose: Provide total, clamping update operations over one progression record.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`ProgressionState`] is the canonical per-user gamification record. Every
//! mutation goes through one of the `apply_*` operations, which are pure and
//! total: they never fail, never overflow, and clamp instead of rejecting.
//! Callers that need rejection semantics (spending XP on a skill, buying a
//! reward) check affordability before calling them.
//!
//! The level is never stored independently: it is always derived from `xp`
//! with a fixed width of [`XP_PER_LEVEL`] per level.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Experience points required per level.
pub const XP_PER_LEVEL: u64 = 100;
/// Lower LifeScore bound.
pub const LIFESCORE_MIN: u32 = 0;
/// Upper LifeScore bound.
pub const LIFESCORE_MAX: u32 = 1_000;

/// Returns the level derived from lifetime XP.
#[must_use]
pub const fn level_for_xp(xp: u64) -> u64 {
    xp / XP_PER_LEVEL + 1
}

// ============================================================================
// SECTION: Progression State
// ============================================================================

/// Per-user progression record.
///
/// # Invariants
/// - `level() == xp() / 100 + 1` at all times.
/// - `lifescore()` is within `[LIFESCORE_MIN, LIFESCORE_MAX]`.
/// - All counters are unsigned; no operation can drive them negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ProgressionRecord", into = "ProgressionRecord")]
pub struct ProgressionState {
    /// Lifetime experience points.
    xp: u64,
    /// Bounded wellbeing score.
    lifescore: u32,
    /// Spendable currency.
    coins: u64,
    /// Consecutive-activity counter.
    streak_days: u32,
}

impl ProgressionState {
    /// Builds a progression record from raw values.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::LifeScoreOutOfRange`] when `lifescore`
    /// exceeds [`LIFESCORE_MAX`].
    pub const fn new(
        xp: u64,
        lifescore: u32,
        coins: u64,
        streak_days: u32,
    ) -> Result<Self, ProgressionError> {
        if lifescore > LIFESCORE_MAX {
            return Err(ProgressionError::LifeScoreOutOfRange(lifescore));
        }
        Ok(Self {
            xp,
            lifescore,
            coins,
            streak_days,
        })
    }

    /// Returns a default record seeded with a starting LifeScore.
    ///
    /// Seeds above [`LIFESCORE_MAX`] are clamped.
    #[must_use]
    pub fn with_starting_lifescore(seed: u32) -> Self {
        Self {
            lifescore: seed.min(LIFESCORE_MAX),
            ..Self::default()
        }
    }

    /// Returns lifetime experience points.
    #[must_use]
    pub const fn xp(&self) -> u64 {
        self.xp
    }

    /// Returns the level derived from XP.
    #[must_use]
    pub const fn level(&self) -> u64 {
        level_for_xp(self.xp)
    }

    /// Returns the current LifeScore.
    #[must_use]
    pub const fn lifescore(&self) -> u32 {
        self.lifescore
    }

    /// Returns the coin balance.
    #[must_use]
    pub const fn coins(&self) -> u64 {
        self.coins
    }

    /// Returns the streak counter in days.
    #[must_use]
    pub const fn streak_days(&self) -> u32 {
        self.streak_days
    }

    /// Applies an XP change, flooring the result at zero.
    ///
    /// `amount` may be negative (spend). The returned [`XpApplied`] reports
    /// whether a level-up occurred.
    #[must_use]
    pub const fn apply_xp(&self, amount: i64) -> XpApplied {
        let state = Self {
            xp: offset_u64(self.xp, amount),
            ..*self
        };
        XpApplied {
            state,
            previous_level: self.level(),
        }
    }

    /// Credits an unsigned XP amount, saturating at `u64::MAX`.
    #[must_use]
    pub const fn earn_xp(&self, amount: u64) -> XpApplied {
        let state = Self {
            xp: self.xp.saturating_add(amount),
            ..*self
        };
        XpApplied {
            state,
            previous_level: self.level(),
        }
    }

    /// Debits an unsigned XP amount, flooring at zero.
    ///
    /// Callers check affordability first; after that check the balance drops
    /// by exactly `cost`.
    #[must_use]
    pub const fn spend_xp(&self, cost: u64) -> XpApplied {
        let state = Self {
            xp: self.xp.saturating_sub(cost),
            ..*self
        };
        XpApplied {
            state,
            previous_level: self.level(),
        }
    }

    /// Applies a LifeScore change, clamping into `[0, 1000]`.
    #[must_use]
    pub fn apply_lifescore(&self, delta: i64) -> Self {
        let raw = i64::from(self.lifescore)
            .saturating_add(delta)
            .clamp(i64::from(LIFESCORE_MIN), i64::from(LIFESCORE_MAX));
        Self {
            lifescore: u32::try_from(raw).unwrap_or(LIFESCORE_MAX),
            ..*self
        }
    }

    /// Applies a coin change, flooring the result at zero.
    ///
    /// This primitive never reports insufficient funds; callers that need
    /// that semantics must check [`ProgressionState::coins`] first.
    #[must_use]
    pub const fn apply_coins(&self, delta: i64) -> Self {
        Self {
            coins: offset_u64(self.coins, delta),
            ..*self
        }
    }

    /// Credits an unsigned coin amount, saturating at `u64::MAX`.
    #[must_use]
    pub const fn earn_coins(&self, amount: u64) -> Self {
        Self {
            coins: self.coins.saturating_add(amount),
            ..*self
        }
    }

    /// Debits an unsigned coin amount, flooring at zero.
    #[must_use]
    pub const fn spend_coins(&self, cost: u64) -> Self {
        Self {
            coins: self.coins.saturating_sub(cost),
            ..*self
        }
    }

    /// Increments the streak, or decays it by one day floored at zero.
    #[must_use]
    pub const fn apply_streak(&self, increment: bool) -> Self {
        let streak_days = if increment {
            self.streak_days.saturating_add(1)
        } else {
            self.streak_days.saturating_sub(1)
        };
        Self {
            streak_days,
            ..*self
        }
    }

    /// Returns the default progression record.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::default()
    }
}

/// Offsets an unsigned counter by a signed delta with saturation at both ends.
const fn offset_u64(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta.unsigned_abs())
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

// ============================================================================
// SECTION: Operation Results
// ============================================================================

/// Result of an XP application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpApplied {
    /// Updated progression record.
    pub state: ProgressionState,
    /// Level before the change.
    pub previous_level: u64,
}

impl XpApplied {
    /// Returns true when the new level exceeds the previous level.
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.state.level() > self.previous_level
    }

    /// Returns the number of levels gained (zero when levels were lost).
    #[must_use]
    pub const fn levels_gained(&self) -> u64 {
        self.state.level().saturating_sub(self.previous_level)
    }
}

/// Signed per-field change between two progression records.
///
/// Used by command results so optimistic UIs can render "+X XP" feedback
/// without recomputing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressionDelta {
    /// XP change.
    pub xp: i64,
    /// LifeScore change.
    pub lifescore: i64,
    /// Coin change.
    pub coins: i64,
    /// Streak change.
    pub streak_days: i64,
    /// Level before the change.
    pub level_before: u64,
    /// Level after the change.
    pub level_after: u64,
}

impl ProgressionDelta {
    /// Computes the change from `before` to `after`.
    #[must_use]
    pub fn between(before: &ProgressionState, after: &ProgressionState) -> Self {
        Self {
            xp: signed_change(before.xp, after.xp),
            lifescore: i64::from(after.lifescore) - i64::from(before.lifescore),
            coins: signed_change(before.coins, after.coins),
            streak_days: i64::from(after.streak_days) - i64::from(before.streak_days),
            level_before: before.level(),
            level_after: after.level(),
        }
    }

    /// Returns true when the change crossed at least one level boundary upward.
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Returns `after - before` as a saturating signed value.
fn signed_change(before: u64, after: u64) -> i64 {
    if after >= before {
        i64::try_from(after - before).unwrap_or(i64::MAX)
    } else {
        i64::try_from(before - after).map_or(i64::MIN, |value| -value)
    }
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

/// Wire form of [`ProgressionState`], carrying the derived level for readers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ProgressionRecord {
    /// Lifetime experience points.
    xp: u64,
    /// Derived level; recomputed and cross-checked on load.
    #[serde(default)]
    level: Option<u64>,
    /// Bounded wellbeing score.
    lifescore: u32,
    /// Spendable currency.
    coins: u64,
    /// Consecutive-activity counter.
    streak_days: u32,
}

impl From<ProgressionState> for ProgressionRecord {
    fn from(state: ProgressionState) -> Self {
        Self {
            xp: state.xp,
            level: Some(state.level()),
            lifescore: state.lifescore,
            coins: state.coins,
            streak_days: state.streak_days,
        }
    }
}

impl TryFrom<ProgressionRecord> for ProgressionState {
    type Error = ProgressionError;

    fn try_from(record: ProgressionRecord) -> Result<Self, Self::Error> {
        let state = Self::new(record.xp, record.lifescore, record.coins, record.streak_days)?;
        if let Some(level) = record.level
            && level != state.level()
        {
            return Err(ProgressionError::LevelMismatch {
                xp: record.xp,
                level,
            });
        }
        Ok(state)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when building a progression record from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    /// LifeScore exceeds the upper bound.
    #[error("lifescore {0} is outside [0, 1000]")]
    LifeScoreOutOfRange(u32),
    /// Stored level disagrees with the level derived from XP.
    #[error("level {level} does not match xp {xp}")]
    LevelMismatch {
        /// Stored XP.
        xp: u64,
        /// Stored level.
        level: u64,
    },
}
