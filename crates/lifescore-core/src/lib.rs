// crates/lifescore-core/src/lib.rs
// ============================================================================
// Module: LifeScore Core Library
// Description: Public API surface for the LifeScore progression engine.
// Purpose: Expose progression types, catalogs, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! LifeScore core owns the progression state engine: the bounded XP, level,
//! LifeScore, coin, and streak calculators, the mission lifecycle, the
//! skill-tree resolver, and reward redemption. It is storage-agnostic and
//! integrates through explicit interfaces; the pure calculators never perform
//! I/O and the [`ProgressionEngine`] is the single command path that hosts
//! call to persist their results.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ProfileStore;
pub use interfaces::StoreError;
pub use runtime::AuditSink;
pub use runtime::CheckIn;
pub use runtime::CheckInStatus;
pub use runtime::CommandOutcome;
pub use runtime::CommandReceipt;
pub use runtime::EngineConfig;
pub use runtime::EngineError;
pub use runtime::FileAuditSink;
pub use runtime::InMemoryProfileStore;
pub use runtime::MissionCompletion;
pub use runtime::MissionError;
pub use runtime::NodeStatus;
pub use runtime::NoopAuditSink;
pub use runtime::ProgressUpdate;
pub use runtime::ProgressionAuditEvent;
pub use runtime::ProgressionEngine;
pub use runtime::RewardError;
pub use runtime::RewardGrant;
pub use runtime::SharedProfileStore;
pub use runtime::SkillError;
pub use runtime::SkillNodeStatus;
pub use runtime::SkillUnlock;
pub use runtime::StderrAuditSink;
pub use runtime::UnmetRequirement;
