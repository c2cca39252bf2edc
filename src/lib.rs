//! Player sync: keeps an event's `players` table in line with the entrant roster
//! and the per-division standings published by the pairing program.

pub mod config;
pub mod logic;
pub mod models;
pub mod net;
pub mod store;
pub mod sync;

pub use config::{entrants_url, ByePolicy, RosterFormat, SyncConfig, TournamentSource};
pub use logic::{
    aggregate_standings, apply_roster_plan, apply_standings_plan, calculate_standings,
    extract_newt, find_missing_players, parse_headed_roster, parse_player_line,
    parse_positional_roster, parse_roster, parse_tournament, plan_roster_sync,
    plan_standings_sync, rank_standings, MissingReport, RosterPlan, RosterSyncOptions,
    StandingsAggregator, StandingsPlan, BATCH_SIZE,
};
pub use models::{
    division_from_value, division_letter, name_key, parse_division_token, rating_band,
    AggregatedStanding, Division, DivisionId, EventId, NewPlayer, PlayerEntry, PlayerId,
    PlayerPatch, RatingBand, RawPlayer, RosterSyncReport, RunId,
    StandingsRecord, StandingsSyncReport, StoredPlayer, SyncCounts, SyncError, TournamentDocument,
};
pub use net::{http_fallback_url, HttpFetcher, SourceFetcher};
pub use store::{PlayerStore, SupabaseStore};
pub use sync::{CollectedStandings, SyncContext};
