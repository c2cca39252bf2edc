//! Run summaries returned by the CLI and the HTTP trigger.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Unique identifier for a sync run (appears in logs and summaries).
pub type RunId = Uuid;

/// Per-record outcome counts of a reconciliation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub dropouts: usize,
    pub not_found: usize,
    pub errors: usize,
}

impl std::fmt::Display for SyncCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} dropped out, {} not found, {} errors",
            self.created, self.updated, self.unchanged, self.dropouts, self.not_found, self.errors
        )
    }
}

/// Summary of a roster (Cross-Tables) sync.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSyncReport {
    pub success: bool,
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub players_processed: usize,
    #[serde(flatten)]
    pub counts: SyncCounts,
}

/// Summary of a standings (tourney.js) sync.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsSyncReport {
    pub success: bool,
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub divisions_processed: usize,
    pub division_errors: usize,
    pub total_players: usize,
    #[serde(flatten)]
    pub counts: SyncCounts,
}
