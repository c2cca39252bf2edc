//! Data structures for the sync: roster entries, stored rows, rating bands, tournament documents, standings.

mod band;
mod division;
mod document;
mod error;
mod player;
mod report;
mod standings;

pub use band::{rating_band, RatingBand};
pub use division::{division_from_value, division_letter, parse_division_token, DivisionId};
pub use document::{Division, RawPlayer, TournamentDocument};
pub use error::SyncError;
pub use player::{name_key, EventId, NewPlayer, PlayerEntry, PlayerId, PlayerPatch, StoredPlayer};
pub use report::{RosterSyncReport, RunId, StandingsSyncReport, SyncCounts};
pub use standings::{AggregatedStanding, StandingsRecord};
