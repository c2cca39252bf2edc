//! Computed standings, per division and aggregated across sources.

use serde::{Deserialize, Serialize};

/// One player's record in one division of one source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingsRecord {
    pub id: u32,
    pub name: String,
    pub rating: i64,
    /// Division label as the source names it (e.g. `opw`, `a`).
    pub division: String,
    /// Half-wins for ties.
    pub wins: f64,
    pub losses: f64,
    pub spread: i64,
    pub games_played: u32,
}

impl StandingsRecord {
    /// Spread with an explicit sign, as shown in logs (`+50`, `-12`).
    pub fn spread_display(&self) -> String {
        if self.spread >= 0 {
            format!("+{}", self.spread)
        } else {
            self.spread.to_string()
        }
    }
}

/// Totals for one player across every division and source of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStanding {
    #[serde(flatten)]
    pub record: StandingsRecord,
    /// Source names that contributed, one per contributing division.
    pub tournaments: Vec<String>,
}

impl AggregatedStanding {
    pub fn new(record: StandingsRecord, source: impl Into<String>) -> Self {
        Self {
            record,
            tournaments: vec![source.into()],
        }
    }

    /// Add another division's record to the totals.
    pub fn absorb(&mut self, other: &StandingsRecord, source: impl Into<String>) {
        self.record.wins += other.wins;
        self.record.losses += other.losses;
        self.record.spread = self.record.spread.saturating_add(other.spread);
        self.record.games_played += other.games_played;
        self.tournaments.push(source.into());
    }
}
