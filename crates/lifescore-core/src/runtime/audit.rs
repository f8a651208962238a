// crates/lifescore-core/src/runtime/audit.rs
// ============================================================================
// Module: LifeScore Audit Logging
// Description: Structured audit events for progression commands.
// Purpose: Emit one JSON-line record per command without a logging framework.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! The engine reports every command, accepted or rejected, to an
//! [`AuditSink`]. Sinks serialize events as JSON lines so deployments can
//! route them to any log pipeline. Queries are not audited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::ProgressionState;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::core::UserProfile;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Command outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Command committed (or was an accepted no-op).
    Accepted,
    /// Command was rejected; nothing was saved.
    Rejected,
}

/// Progression command audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Caller-supplied command timestamp.
    pub timestamp: Timestamp,
    /// User the command targeted.
    pub user_id: String,
    /// Command label.
    pub command: &'static str,
    /// Command outcome.
    pub outcome: CommandOutcome,
    /// Normalized error kind label on rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// Mission, node, or reward the command addressed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Profile version after the command (current version on rejection).
    pub profile_version: u64,
    /// Progression record after an accepted command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progression: Option<ProgressionState>,
}

impl ProgressionAuditEvent {
    /// Event identifier shared by all progression commands.
    pub const EVENT: &'static str = "progression_command";

    /// Builds the event for an accepted command.
    #[must_use]
    pub fn accepted(
        command: &'static str,
        at: Timestamp,
        subject: Option<String>,
        profile: &UserProfile,
    ) -> Self {
        Self {
            event: Self::EVENT,
            timestamp: at,
            user_id: profile.user_id.to_string(),
            command,
            outcome: CommandOutcome::Accepted,
            error_kind: None,
            subject,
            profile_version: profile.version,
            progression: Some(profile.progression),
        }
    }

    /// Builds the event for a rejected command.
    #[must_use]
    pub fn rejected(
        command: &'static str,
        at: Timestamp,
        user_id: &UserId,
        subject: Option<String>,
        profile_version: u64,
        error_kind: &'static str,
    ) -> Self {
        Self {
            event: Self::EVENT,
            timestamp: at,
            user_id: user_id.to_string(),
            command,
            outcome: CommandOutcome::Rejected,
            error_kind: Some(error_kind),
            subject,
            profile_version,
            progression: None,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for progression command events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ProgressionAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &ProgressionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &ProgressionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &ProgressionAuditEvent) {}
}
