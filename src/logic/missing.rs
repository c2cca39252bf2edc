//! Roster vs store comparison, for checking a sync by eye before or after running it.

use crate::models::{name_key, DivisionId, PlayerEntry, StoredPlayer};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;

/// Players on one side but not the other.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissingReport {
    /// In the roster, absent from the store.
    pub missing: Vec<PlayerEntry>,
    /// In the store, absent from the roster (withdrawn or removed).
    pub extra: Vec<StoredPlayer>,
}

const CSV_HEADER: [&str; 5] = ["side", "name", "rating", "division", "dropped_out"];

/// One CSV line of the export; field order follows `CSV_HEADER`.
#[derive(Debug, Serialize)]
struct MissingRow<'a> {
    side: &'static str,
    name: &'a str,
    rating: Option<i64>,
    division: Option<DivisionId>,
    dropped_out: bool,
}

pub fn find_missing_players(roster: &[PlayerEntry], stored: &[StoredPlayer]) -> MissingReport {
    let stored_names: HashSet<String> = stored.iter().map(StoredPlayer::key).collect();
    let roster_names: HashSet<String> = roster.iter().map(|p| name_key(&p.name)).collect();

    MissingReport {
        missing: roster
            .iter()
            .filter(|p| !stored_names.contains(&p.key()))
            .cloned()
            .collect(),
        extra: stored
            .iter()
            .filter(|p| !roster_names.contains(&p.key()))
            .cloned()
            .collect(),
    }
}

impl MissingReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    /// Missing roster players of one division, in roster order.
    pub fn missing_in_division(&self, division: DivisionId) -> impl Iterator<Item = &PlayerEntry> {
        self.missing.iter().filter(move |p| p.division == division)
    }

    /// Write both sides as CSV: `side,name,rating,division,dropped_out`.
    /// The header line is written even when both sides are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        out.write_record(CSV_HEADER)?;
        for p in &self.missing {
            out.serialize(MissingRow {
                side: "missing",
                name: &p.name,
                rating: Some(i64::from(p.rating)),
                division: Some(p.division),
                dropped_out: false,
            })?;
        }
        for p in &self.extra {
            out.serialize(MissingRow {
                side: "extra",
                name: &p.name,
                rating: p.current_rating,
                division: p.current_division(),
                dropped_out: p.dropped_out,
            })?;
        }
        out.flush()?;
        Ok(())
    }
}
