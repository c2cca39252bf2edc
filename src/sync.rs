//! Sync runs: fetch sources, compute, reconcile against the store, report.

use crate::config::SyncConfig;
use crate::logic::{
    apply_roster_plan, apply_standings_plan, calculate_standings, find_missing_players,
    parse_roster, parse_tournament, plan_roster_sync, plan_standings_sync, MissingReport,
    RosterSyncOptions, StandingsAggregator,
};
use crate::models::{
    AggregatedStanding, PlayerEntry, RosterSyncReport, StandingsRecord, StandingsSyncReport,
    SyncError,
};
use crate::net::SourceFetcher;
use crate::store::PlayerStore;
use chrono::Utc;
use futures::future::join_all;
use uuid::Uuid;

/// Standings gathered from every configured division.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectedStandings {
    pub standings: Vec<AggregatedStanding>,
    pub divisions_processed: usize,
    pub division_errors: usize,
}

/// Everything a run needs, constructed once and passed in.
pub struct SyncContext<F, S> {
    pub config: SyncConfig,
    pub fetcher: F,
    pub store: S,
}

impl<F, S> SyncContext<F, S>
where
    F: SourceFetcher,
    S: PlayerStore,
{
    pub fn new(config: SyncConfig, fetcher: F, store: S) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    /// Download and parse the roster. An empty roster is an error: reconciling
    /// against it would mark every stored player as dropped out.
    pub async fn fetch_roster(&self) -> Result<Vec<PlayerEntry>, SyncError> {
        log::info!("Fetching player data from {}", self.config.cross_tables_url);
        let text = self.fetcher.fetch_text(&self.config.cross_tables_url).await?;
        let players = parse_roster(&text, self.config.roster_format, self.config.max_divisions);
        if players.is_empty() {
            return Err(SyncError::NoUsableData(format!(
                "no players parsed from {}",
                self.config.cross_tables_url
            )));
        }
        log::info!("Parsed {} players from all divisions", players.len());
        Ok(players)
    }

    /// Roster sync: create new players, update rating/division, mark dropouts.
    pub async fn sync_roster(&self) -> Result<RosterSyncReport, SyncError> {
        let run_id = Uuid::new_v4();
        log::info!("Roster sync {} starting for event {}", run_id, self.config.event_id);

        let players = self.fetch_roster().await?;
        let existing = self.store.fetch_players(self.config.event_id).await?;
        log::info!("Found {} existing players in database", existing.len());
        let bands = self.store.fetch_rating_bands(self.config.event_id).await?;
        log::debug!("Loaded {} rating bands", bands.len());

        let options = RosterSyncOptions {
            event_id: self.config.event_id,
            freeze_ratings: self.config.freeze_ratings,
        };
        let plan = plan_roster_sync(&players, &existing, &bands, options, Utc::now());
        let counts = apply_roster_plan(&self.store, plan).await;
        log::info!("Roster sync {} finished: {}", run_id, counts);

        Ok(RosterSyncReport {
            success: true,
            run_id,
            timestamp: Utc::now(),
            players_processed: players.len(),
            counts,
        })
    }

    /// Fetch every configured division concurrently and aggregate the standings.
    ///
    /// A division that fails to download or parse is counted and skipped.
    /// Fails only when no player standings came back at all.
    pub async fn collect_standings(&self) -> Result<CollectedStandings, SyncError> {
        let targets: Vec<(&str, &str, String)> = self
            .config
            .sources
            .iter()
            .flat_map(|source| {
                source
                    .divisions
                    .iter()
                    .map(move |division| (source.name.as_str(), division.as_str(), source.division_url(division)))
            })
            .collect();
        log::info!(
            "Fetching tournament data for {} divisions across {} tournaments...",
            targets.len(),
            self.config.sources.len()
        );

        let bodies = join_all(targets.iter().map(|(_, _, url)| self.fetcher.fetch_text(url))).await;

        let mut collected = CollectedStandings::default();
        let mut aggregator = StandingsAggregator::new();
        for ((source, division, url), body) in targets.iter().zip(bodies) {
            let label = division.to_uppercase();
            let result = body.and_then(|js| self.division_standings(&js, division));
            match result {
                Ok(records) => {
                    log::info!("{} division {}: {} players processed", source, label, records.len());
                    aggregator.add(source, records);
                    collected.divisions_processed += 1;
                }
                Err(e) => {
                    log::warn!("{} division {} ({}) skipped: {}", source, label, url, e);
                    collected.division_errors += 1;
                }
            }
        }

        if aggregator.is_empty() {
            return Err(SyncError::NoUsableData(
                "no standings data retrieved from any division".to_string(),
            ));
        }
        log::info!("Total players across all divisions: {}", aggregator.len());
        collected.standings = aggregator.into_standings();
        Ok(collected)
    }

    fn division_standings(&self, js: &str, division: &str) -> Result<Vec<StandingsRecord>, SyncError> {
        let document = parse_tournament(js)?;
        calculate_standings(&document, division, self.config.bye_policy)
    }

    /// Standings sync: write tournament totals onto the matching stored players.
    pub async fn sync_standings(&self) -> Result<StandingsSyncReport, SyncError> {
        let run_id = Uuid::new_v4();
        log::info!("Standings sync {} starting for event {}", run_id, self.config.event_id);

        let collected = self.collect_standings().await?;
        // Read as late as possible: rows are written back whole.
        let existing = self.store.fetch_players(self.config.event_id).await?;
        log::info!("Found {} existing players in database", existing.len());

        let plan = plan_standings_sync(&collected.standings, &existing, Utc::now());
        let counts = apply_standings_plan(&self.store, plan).await;
        log::info!("Standings sync {} finished: {}", run_id, counts);

        Ok(StandingsSyncReport {
            success: true,
            run_id,
            timestamp: Utc::now(),
            divisions_processed: collected.divisions_processed,
            division_errors: collected.division_errors,
            total_players: collected.standings.len(),
            counts,
        })
    }

    /// Compare roster and store without writing anything.
    pub async fn missing_players(&self) -> Result<(Vec<PlayerEntry>, MissingReport), SyncError> {
        let players = self.fetch_roster().await?;
        let existing = self.store.fetch_players(self.config.event_id).await?;
        let report = find_missing_players(&players, &existing);
        Ok((players, report))
    }
}
