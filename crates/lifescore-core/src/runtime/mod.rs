// crates/lifescore-core/src/runtime/mod.rs
// ============================================================================
// Module: LifeScore Runtime
// Description: Mission lifecycle, skill resolver, rewards, and the engine.
// Purpose: Execute progression commands over user profiles.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the three progression components as pure
//! transitions over a [`crate::core::UserProfile`], plus the
//! [`ProgressionEngine`] that persists and audits them. All external
//! surfaces must call into the engine to preserve per-user serialization.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod engine;
pub mod missions;
pub mod requirements;
pub mod rewards;
pub mod skills;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::CommandOutcome;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ProgressionAuditEvent;
pub use audit::StderrAuditSink;
pub use engine::CheckIn;
pub use engine::CheckInStatus;
pub use engine::CommandReceipt;
pub use engine::EngineConfig;
pub use engine::EngineError;
pub use engine::ProgressionEngine;
pub use missions::MissionCompletion;
pub use missions::MissionError;
pub use missions::ProgressUpdate;
pub use requirements::UnmetRequirement;
pub use rewards::RewardError;
pub use rewards::RewardGrant;
pub use skills::NodeStatus;
pub use skills::SkillError;
pub use skills::SkillNodeStatus;
pub use skills::SkillUnlock;
pub use store::InMemoryProfileStore;
pub use store::SharedProfileStore;
