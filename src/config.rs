//! Runtime configuration, read from environment variables with defaults.

use crate::models::{EventId, SyncError};
use serde::Deserialize;

const DEFAULT_CROSS_TABLES_URL: &str = "https://www.cross-tables.com/entrants.php?u=16463&text=1";
const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";

/// How the roster text marks its divisions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RosterFormat {
    /// `Division 1` / `Division A` header lines.
    #[default]
    Headed,
    /// No headers: first blank line starts division 2, the next one ends the list.
    Positional,
}

/// What a round against opponent 0 with a non-zero score is worth.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ByePolicy {
    /// Negative score is a loss, anything else a win; score goes into spread.
    Scored,
    /// Byes only count as a game played. Forfeits (negative score) still count as losses.
    #[default]
    Excluded,
}

/// One tournament site whose divisions feed the standings.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSource {
    pub name: String,
    pub base_url: String,
    pub divisions: Vec<String>,
    #[serde(default = "default_url_pattern")]
    pub url_pattern: String,
}

fn default_url_pattern() -> String {
    "{baseUrl}{division}/tourney.js".to_string()
}

impl TournamentSource {
    /// URL of one division's `tourney.js`.
    pub fn division_url(&self, division: &str) -> String {
        self.url_pattern
            .replace("{baseUrl}", &self.base_url)
            .replace("{division}", division)
    }
}

impl Default for TournamentSource {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            base_url: "https://bkkcrossword.com/tsh/ToAutoCar2025/".to_string(),
            divisions: vec!["opw".to_string()],
            url_pattern: default_url_pattern(),
        }
    }
}

/// Everything a sync run needs besides its clients.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncConfig {
    pub event_id: EventId,
    pub cross_tables_url: String,
    pub roster_format: RosterFormat,
    /// Parsing stops at the first division header above this.
    pub max_divisions: u32,
    /// Keep stored ratings; only division changes are written.
    pub freeze_ratings: bool,
    pub bye_policy: ByePolicy,
    pub sources: Vec<TournamentSource>,
    pub supabase_url: String,
    pub supabase_key: String,
    /// Minutes between scheduled runs in the web binary; 0 disables.
    pub sync_interval_minutes: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            event_id: 1,
            cross_tables_url: DEFAULT_CROSS_TABLES_URL.to_string(),
            roster_format: RosterFormat::Headed,
            max_divisions: 2,
            freeze_ratings: false,
            bye_policy: ByePolicy::Excluded,
            sources: vec![TournamentSource::default()],
            supabase_url: DEFAULT_SUPABASE_URL.to_string(),
            supabase_key: String::new(),
            sync_interval_minutes: 0,
        }
    }
}

impl SyncConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let event_id = match get("EVENT_ID") {
            Some(v) => parse_number(&v, "EVENT_ID")?,
            None => defaults.event_id,
        };
        let max_divisions = match get("MAX_DIVISIONS") {
            Some(v) => parse_number(&v, "MAX_DIVISIONS")?,
            None => defaults.max_divisions,
        };
        let sync_interval_minutes = match get("SYNC_INTERVAL_MINUTES") {
            Some(v) => parse_number(&v, "SYNC_INTERVAL_MINUTES")?,
            None => defaults.sync_interval_minutes,
        };
        let roster_format = match get("ROSTER_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            None => defaults.roster_format,
            Some(v) if v == "headed" => RosterFormat::Headed,
            Some(v) if v == "positional" => RosterFormat::Positional,
            Some(v) => return Err(SyncError::Config(format!("ROSTER_FORMAT must be headed or positional, got {}", v))),
        };
        let bye_policy = match get("BYE_POLICY").as_deref().map(str::to_ascii_lowercase) {
            None => defaults.bye_policy,
            Some(v) if v == "scored" => ByePolicy::Scored,
            Some(v) if v == "excluded" => ByePolicy::Excluded,
            Some(v) => return Err(SyncError::Config(format!("BYE_POLICY must be scored or excluded, got {}", v))),
        };
        let freeze_ratings = match get("FREEZE_RATINGS") {
            Some(v) => parse_flag(&v, "FREEZE_RATINGS")?,
            None => defaults.freeze_ratings,
        };
        let sources = match get("TOURNAMENT_SOURCES") {
            Some(v) => serde_json::from_str(&v)
                .map_err(|e| SyncError::Config(format!("TOURNAMENT_SOURCES is not valid JSON: {}", e)))?,
            None => defaults.sources,
        };

        Ok(Self {
            event_id,
            cross_tables_url: get("CROSS_TABLES_URL").unwrap_or(defaults.cross_tables_url),
            roster_format,
            max_divisions,
            freeze_ratings,
            bye_policy,
            sources,
            supabase_url: get("SUPABASE_URL").unwrap_or(defaults.supabase_url),
            supabase_key: get("SUPABASE_SERVICE_ROLE_KEY").unwrap_or(defaults.supabase_key),
            sync_interval_minutes,
        })
    }
}

/// Text entrant listing on Cross-Tables for an external event id.
pub fn entrants_url(external_event_id: &str) -> String {
    format!(
        "https://www.cross-tables.com/entrants.php?u={}&text=1",
        external_event_id.trim()
    )
}

impl SyncConfig {
    /// Point the roster at another source: a full URL, or a Cross-Tables event id.
    pub fn set_roster_source(&mut self, source: &str) {
        self.cross_tables_url = if source.contains("://") {
            source.to_string()
        } else {
            entrants_url(source)
        };
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, SyncError> {
    value
        .parse()
        .map_err(|_| SyncError::Config(format!("{} must be a number, got {}", key, value)))
}

fn parse_flag(value: &str, key: &str) -> Result<bool, SyncError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SyncError::Config(format!("{} must be true or false, got {}", key, value))),
    }
}
