//! Typed view of the `newt` document served in a division's `tourney.js`.
//!
//! Only the fields the standings need are modelled; everything else in the
//! document (config, round metadata, ...) is ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Root of the extracted document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TournamentDocument {
    #[serde(default)]
    pub divisions: Vec<Division>,
}

/// One division. `players[0]` is a null sentinel; real players start at 1.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Division {
    #[serde(default)]
    pub players: Vec<Option<RawPlayer>>,
}

impl Division {
    /// Real players with their array index, sentinel and holes skipped.
    pub fn real_players(&self) -> impl Iterator<Item = (usize, &RawPlayer)> {
        self.players
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(idx, p)| p.as_ref().map(|p| (idx, p)))
    }
}

/// A player as the pairing program records it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawPlayer {
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rating: i64,
    /// Points per round; 0 for rounds not yet played.
    #[serde(default, deserialize_with = "lenient_i64_seq")]
    pub scores: Vec<i64>,
    /// Opponent id per round; 0 means no opponent (bye, forfeit or unplayed).
    #[serde(default, deserialize_with = "lenient_u32_seq")]
    pub pairings: Vec<u32>,
}

impl RawPlayer {
    /// Opponent reference for a round; a missing entry reads as 0.
    pub fn opponent(&self, round: usize) -> u32 {
        self.pairings.get(round).copied().unwrap_or(0)
    }
}

// Numbers in the document may be null (the repaired `undefined`) or written as floats.

fn value_to_i64(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(|v| value_to_i64(&v))
        .unwrap_or(0))
}

fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|v| u32::try_from(value_to_i64(&v)).ok()))
}

fn lenient_i64_seq<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .iter()
        .map(value_to_i64)
        .collect())
}

fn lenient_u32_seq<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .iter()
        .map(|v| u32::try_from(value_to_i64(v)).unwrap_or(0))
        .collect())
}
