// crates/lifescore-cli/src/lib.rs
// ============================================================================
// Module: LifeScore CLI Library
// Description: Shared helpers for the LifeScore command-line interface.
// Purpose: Assemble the progression engine from configuration for the binary.
// Dependencies: lifescore-config, lifescore-core, lifescore-store-sqlite
// ============================================================================

//! ## Overview
//! This library houses the host wiring the `lifescore` binary uses to turn a
//! validated [`lifescore_config::LifeScoreConfig`] into a running
//! [`lifescore_core::ProgressionEngine`]. The binary entry point
//! (`src/main.rs`) only parses arguments and formats output.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Engine assembly from configuration.
pub mod host;
