//! Sync pipeline logic: parsing, extraction, standings, aggregation, reconciliation.

mod aggregate;
mod extract;
mod missing;
mod reconcile;
mod roster;
mod standings;

pub use aggregate::{aggregate_standings, StandingsAggregator};
pub use extract::{extract_newt, parse_tournament};
pub use missing::{find_missing_players, MissingReport};
pub use reconcile::{
    apply_roster_plan, apply_standings_plan, plan_roster_sync, plan_standings_sync, RosterPlan,
    RosterSyncOptions, StandingsPlan, BATCH_SIZE,
};
pub use roster::{parse_headed_roster, parse_player_line, parse_positional_roster, parse_roster};
pub use standings::{calculate_standings, rank_standings};
