//! Reconciliation: diff fresh source data against the stored snapshot, then write the difference.
//!
//! Planning is pure (snapshot + fresh data + clock in, write plan out) so the
//! decisions can be inspected and tested without a store. Applying a plan
//! never aborts: each failed write is logged and counted.

use crate::models::{
    name_key, rating_band, AggregatedStanding, EventId, NewPlayer, PlayerEntry, PlayerPatch,
    RatingBand, StoredPlayer, SyncCounts,
};
use crate::store::PlayerStore;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};

/// Writes issued together; the next chunk starts only when this one has settled.
pub const BATCH_SIZE: usize = 10;

/// Knobs for a roster sync.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RosterSyncOptions {
    pub event_id: EventId,
    /// Never overwrite stored ratings; division changes still go through.
    pub freeze_ratings: bool,
}

/// What a roster sync will write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RosterPlan {
    pub inserts: Vec<NewPlayer>,
    pub updates: Vec<PlayerPatch>,
    pub dropouts: Vec<PlayerPatch>,
    pub unchanged: usize,
}

/// Snapshot rows by matching key. A later row with the same key replaces an earlier one.
fn index_by_name(existing: &[StoredPlayer]) -> HashMap<String, &StoredPlayer> {
    existing.iter().map(|p| (p.key(), p)).collect()
}

/// Decide insert / update / unchanged for every roster entry, and dropout for
/// every stored player the roster no longer lists.
///
/// `bands` assigns a rating band to every rating written; a rating outside
/// all bands is written without one.
pub fn plan_roster_sync(
    entries: &[PlayerEntry],
    existing: &[StoredPlayer],
    bands: &[RatingBand],
    options: RosterSyncOptions,
    now: DateTime<Utc>,
) -> RosterPlan {
    let by_name = index_by_name(existing);
    let mut plan = RosterPlan::default();
    let mut seen: HashSet<String> = HashSet::new();

    for entry in entries {
        let key = entry.key();
        if !seen.insert(key.clone()) {
            log::warn!("{} appears more than once in the roster, keeping the first entry", entry.name);
            continue;
        }

        let Some(stored) = by_name.get(&key) else {
            log::info!("Will create: {} ({}, Division {})", entry.name, entry.rating, entry.division);
            let band = rating_band(i64::from(entry.rating), bands);
            plan.inserts.push(NewPlayer::from_entry(options.event_id, entry, band));
            continue;
        };

        match roster_patch(stored, entry, bands, options.freeze_ratings, now) {
            Some(patch) => plan.updates.push(patch),
            None => {
                log::debug!("{} unchanged", entry.name);
                plan.unchanged += 1;
            }
        }
    }

    for stored in existing {
        if stored.dropped_out || seen.contains(&stored.key()) {
            continue;
        }
        log::info!("Will mark dropped out: {} (no longer in roster)", stored.name);
        plan.dropouts.push(PlayerPatch::dropout(stored, now));
    }

    plan
}

/// Targeted patch for a matched player, or `None` when nothing would be written.
fn roster_patch(
    stored: &StoredPlayer,
    entry: &PlayerEntry,
    bands: &[RatingBand],
    freeze_ratings: bool,
    now: DateTime<Utc>,
) -> Option<PlayerPatch> {
    let rating = i64::from(entry.rating);
    let stored_division = stored.current_division();
    let rating_changed = stored.current_rating != Some(rating);
    let division_changed = stored_division != Some(entry.division);

    let mut patch = PlayerPatch::new(stored, now);
    let mut changes = Vec::new();

    if rating_changed {
        let from = stored.current_rating.map_or("none".to_string(), |r| r.to_string());
        if freeze_ratings {
            log::info!("Would update {} rating {} → {} (ratings frozen)", entry.name, from, rating);
        } else {
            changes.push(format!("rating {} → {}", from, rating));
            patch.current_rating = Some(rating);
            patch.current_rating_band_id = rating_band(rating, bands).map(|band| band.id);
        }
    }
    if division_changed {
        let from = stored_division.map_or("none".to_string(), |d| d.to_string());
        changes.push(format!("division {} → {}", from, entry.division));
        patch.current_division = Some(entry.division);
    }

    if changes.is_empty() {
        return None;
    }
    log::info!("Will update {}: {}", entry.name, changes.join(", "));
    Some(patch)
}

/// Write a roster plan: one bulk insert, then updates and dropouts chunk by chunk.
pub async fn apply_roster_plan<S>(store: &S, plan: RosterPlan) -> SyncCounts
where
    S: PlayerStore + ?Sized,
{
    let mut counts = SyncCounts {
        unchanged: plan.unchanged,
        ..SyncCounts::default()
    };

    if !plan.inserts.is_empty() {
        log::info!("Bulk inserting {} new players...", plan.inserts.len());
        match store.insert_players(&plan.inserts).await {
            Ok(()) => counts.created = plan.inserts.len(),
            Err(e) => {
                log::error!("Error bulk inserting players: {}", e);
                counts.errors += plan.inserts.len();
            }
        }
    }

    if !plan.updates.is_empty() {
        log::info!("Updating {} existing players...", plan.updates.len());
        let (ok, failed) = write_patches(store, &plan.updates).await;
        counts.updated = ok;
        counts.errors += failed;
    }

    if !plan.dropouts.is_empty() {
        log::info!("Marking {} players as dropped out...", plan.dropouts.len());
        let (ok, failed) = write_patches(store, &plan.dropouts).await;
        counts.dropouts = ok;
        counts.errors += failed;
    }

    counts
}

/// Issue patches `BATCH_SIZE` at a time. Returns (written, failed).
async fn write_patches<S>(store: &S, patches: &[PlayerPatch]) -> (usize, usize)
where
    S: PlayerStore + ?Sized,
{
    let mut written = 0;
    let mut failed = 0;

    for (batch_no, batch) in patches.chunks(BATCH_SIZE).enumerate() {
        let results = join_all(batch.iter().map(|patch| store.update_player(patch))).await;
        let mut batch_errors = 0;
        for (patch, result) in batch.iter().zip(results) {
            if let Err(e) = result {
                log::error!("Error updating {}: {}", patch.name, e);
                batch_errors += 1;
            }
        }
        written += batch.len() - batch_errors;
        failed += batch_errors;
        log::info!(
            "Batch {}: {} updated, {} errors",
            batch_no + 1,
            batch.len() - batch_errors,
            batch_errors
        );
    }

    (written, failed)
}

/// What a standings sync will write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StandingsPlan {
    /// Complete rows: stored record with the tournament totals replaced.
    pub upserts: Vec<StoredPlayer>,
    pub not_found: usize,
    /// Standings without a usable name; counted as errors.
    pub invalid: usize,
}

/// Merge aggregated totals into the matching stored rows.
///
/// Whole rows are written back rather than patches, so the snapshot must be
/// read right before planning.
pub fn plan_standings_sync(
    standings: &[AggregatedStanding],
    existing: &[StoredPlayer],
    now: DateTime<Utc>,
) -> StandingsPlan {
    let by_name = index_by_name(existing);
    let mut plan = StandingsPlan::default();

    for standing in standings {
        let record = &standing.record;
        if record.name.trim().is_empty() {
            log::warn!("Skipping standings record with empty name (id {})", record.id);
            plan.invalid += 1;
            continue;
        }

        let Some(stored) = by_name.get(&name_key(&record.name)) else {
            log::warn!("Player not found in database: {} ({})", record.name, record.division.to_uppercase());
            plan.not_found += 1;
            continue;
        };

        let mut row = (*stored).clone();
        row.tournament_wins = Some(record.wins);
        row.tournament_losses = Some(record.losses);
        row.tournament_spread = Some(record.spread);
        row.tournament_games_played = Some(record.games_played);
        row.last_standings_update = Some(now);
        log::info!(
            "Will update {} (ID: {}) ({}): {}-{} ({})",
            record.name,
            stored.id,
            record.division.to_uppercase(),
            record.wins,
            record.losses,
            record.spread_display()
        );
        plan.upserts.push(row);
    }

    plan
}

/// Upsert the planned rows `BATCH_SIZE` at a time; a failed chunk counts all its rows as errors.
pub async fn apply_standings_plan<S>(store: &S, plan: StandingsPlan) -> SyncCounts
where
    S: PlayerStore + ?Sized,
{
    let mut counts = SyncCounts {
        not_found: plan.not_found,
        errors: plan.invalid,
        ..SyncCounts::default()
    };

    for (batch_no, batch) in plan.upserts.chunks(BATCH_SIZE).enumerate() {
        match store.upsert_players(batch).await {
            Ok(written) => counts.updated += written,
            Err(e) => {
                log::error!("Batch {} upsert failed: {}", batch_no + 1, e);
                counts.errors += batch.len();
            }
        }
    }

    counts
}
