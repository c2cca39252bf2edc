//! Player records: parsed roster entries and rows of the external `players` table.

use crate::models::band::RatingBand;
use crate::models::division::{division_from_value, DivisionId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Durable primary key owned by the player store.
pub type PlayerId = i64;

/// Identifier of the event whose players are synced.
pub type EventId = i64;

/// Matching key shared by every source: trimmed, lower-cased name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One player line from the roster text.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub name: String,
    pub rating: u32,
    pub division: DivisionId,
}

impl PlayerEntry {
    /// Create an entry; the name is trimmed.
    pub fn new(name: impl Into<String>, rating: u32, division: DivisionId) -> Self {
        let name = name.into();
        Self {
            name: name.trim().to_string(),
            rating,
            division,
        }
    }

    pub fn key(&self) -> String {
        name_key(&self.name)
    }
}

/// A row of the external `players` table, as read from the store.
///
/// Columns this crate does not know about are kept in `extra` so that a
/// full-record write-back returns them untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredPlayer {
    pub id: PlayerId,
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub name: String,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub dropped_out: bool,
    #[serde(default)]
    pub current_rating: Option<i64>,
    /// The division column exactly as stored (number, numeric string or letter),
    /// so a write-back returns it unchanged. Read it through `current_division()`.
    #[serde(default, rename = "current_division")]
    pub division_column: Option<Value>,
    #[serde(default)]
    pub current_rating_band_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tournament_wins: Option<f64>,
    #[serde(default)]
    pub tournament_losses: Option<f64>,
    #[serde(default)]
    pub tournament_spread: Option<i64>,
    #[serde(default)]
    pub tournament_games_played: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_standings_update: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredPlayer {
    /// A fresh active row; mostly useful for building snapshots.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            event_id: None,
            name: name.into(),
            external_id: None,
            is_active: true,
            dropped_out: false,
            current_rating: None,
            division_column: None,
            current_rating_band_id: None,
            updated_at: None,
            tournament_wins: None,
            tournament_losses: None,
            tournament_spread: None,
            tournament_games_played: None,
            last_standings_update: None,
            extra: Map::new(),
        }
    }

    pub fn key(&self) -> String {
        name_key(&self.name)
    }

    /// Stored division in canonical form; `None` when unset or unreadable.
    pub fn current_division(&self) -> Option<DivisionId> {
        self.division_column.as_ref().and_then(division_from_value)
    }

    pub fn set_current_division(&mut self, division: DivisionId) {
        self.division_column = Some(Value::from(division));
    }

    /// Apply a targeted update to this row (what the store does for a PATCH).
    pub fn apply_patch(&mut self, patch: &PlayerPatch) {
        if let Some(rating) = patch.current_rating {
            self.current_rating = Some(rating);
        }
        if let Some(division) = patch.current_division {
            self.set_current_division(division);
        }
        if let Some(band) = patch.current_rating_band_id {
            self.current_rating_band_id = Some(band);
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        if let Some(dropped) = patch.dropped_out {
            self.dropped_out = dropped;
        }
        self.updated_at = Some(patch.updated_at);
    }
}

fn default_true() -> bool {
    true
}

/// Accept RFC 3339 timestamps and the offset-less form some columns return (read as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

/// Insert payload for a player seen in the roster but not in the store.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NewPlayer {
    pub event_id: EventId,
    pub name: String,
    pub current_rating: i64,
    pub original_rating: i64,
    pub current_rating_band_id: Option<i64>,
    pub original_rating_band_id: Option<i64>,
    pub current_division: DivisionId,
    pub external_id: Option<String>,
    pub is_active: bool,
    pub dropped_out: bool,
}

impl NewPlayer {
    /// Roster rating becomes both current and original; likewise its band.
    pub fn from_entry(event_id: EventId, entry: &PlayerEntry, band: Option<&RatingBand>) -> Self {
        let rating = i64::from(entry.rating);
        let band_id = band.map(|b| b.id);
        Self {
            event_id,
            name: entry.name.clone(),
            current_rating: rating,
            original_rating: rating,
            current_rating_band_id: band_id,
            original_rating_band_id: band_id,
            current_division: entry.division,
            external_id: None,
            is_active: true,
            dropped_out: false,
        }
    }
}

/// Targeted update of an existing row: only the set fields are written.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerPatch {
    #[serde(skip)]
    pub id: PlayerId,
    /// For log lines only.
    #[serde(skip)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_rating_band_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_division: Option<DivisionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_out: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerPatch {
    /// An empty patch that only bumps `updated_at`.
    pub fn new(player: &StoredPlayer, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            current_rating: None,
            current_rating_band_id: None,
            current_division: None,
            is_active: None,
            dropped_out: None,
            updated_at,
        }
    }

    /// Mark the player withdrawn.
    pub fn dropout(player: &StoredPlayer, updated_at: DateTime<Utc>) -> Self {
        Self {
            is_active: Some(false),
            dropped_out: Some(true),
            ..Self::new(player, updated_at)
        }
    }
}
