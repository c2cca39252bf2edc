//! Standings from round-by-round scores and pairings of one division.

use crate::config::ByePolicy;
use crate::models::{RawPlayer, StandingsRecord, SyncError, TournamentDocument};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Compute one `StandingsRecord` per real player of the document's first division.
///
/// Per round:
/// 1. opponent 0 and score 0: not played yet, skipped entirely;
/// 2. otherwise the round counts toward `games_played`;
/// 3. opponent 0: bye or forfeit, scored per `policy`;
/// 4. real opponent: compare same-round scores (tie = half a win and half a
///    loss) and add the difference to spread. An opponent that cannot be
///    found is logged and the round contributes nothing else.
pub fn calculate_standings(
    document: &TournamentDocument,
    division_label: &str,
    policy: ByePolicy,
) -> Result<Vec<StandingsRecord>, SyncError> {
    let division = document.divisions.first().ok_or(SyncError::MissingDivision)?;

    let by_id: HashMap<u32, &RawPlayer> = division
        .real_players()
        .map(|(idx, p)| (p.id.unwrap_or(idx as u32), p))
        .collect();

    let standings = division
        .real_players()
        .map(|(idx, player)| {
            let id = player.id.unwrap_or(idx as u32);
            player_record(id, player, &by_id, division_label, policy)
        })
        .collect();

    Ok(standings)
}

fn player_record(
    id: u32,
    player: &RawPlayer,
    by_id: &HashMap<u32, &RawPlayer>,
    division_label: &str,
    policy: ByePolicy,
) -> StandingsRecord {
    let mut record = StandingsRecord {
        id,
        name: player.name.clone(),
        rating: player.rating,
        division: division_label.to_string(),
        ..StandingsRecord::default()
    };

    for (round, &score) in player.scores.iter().enumerate() {
        let opponent_id = player.opponent(round);
        if opponent_id == 0 && score == 0 {
            continue;
        }
        record.games_played += 1;

        if opponent_id == 0 {
            apply_unopposed_round(&mut record, score, round, policy);
            continue;
        }

        let opponent_score = by_id
            .get(&opponent_id)
            .and_then(|opponent| opponent.scores.get(round).copied());
        let Some(opponent_score) = opponent_score else {
            log::warn!(
                "Could not find opponent {} for {} in round {} (division {})",
                opponent_id,
                player.name,
                round + 1,
                division_label
            );
            continue;
        };

        match score.cmp(&opponent_score) {
            Ordering::Greater => record.wins += 1.0,
            Ordering::Less => record.losses += 1.0,
            Ordering::Equal => {
                record.wins += 0.5;
                record.losses += 0.5;
            }
        }
        record.spread = record.spread.saturating_add(score.saturating_sub(opponent_score));
    }

    record
}

fn apply_unopposed_round(record: &mut StandingsRecord, score: i64, round: usize, policy: ByePolicy) {
    if score < 0 {
        // forfeit
        record.losses += 1.0;
        record.spread = record.spread.saturating_add(score);
        return;
    }
    match policy {
        ByePolicy::Scored => {
            record.wins += 1.0;
            record.spread = record.spread.saturating_add(score);
        }
        ByePolicy::Excluded => {
            log::debug!("Skipping bye for {} in round {} (score: {})", record.name, round + 1, score);
        }
    }
}

/// Competition order: wins descending, then spread descending.
pub fn rank_standings(standings: &mut [StandingsRecord]) {
    standings.sort_by(|a, b| {
        b.wins
            .total_cmp(&a.wins)
            .then_with(|| b.spread.cmp(&a.spread))
    });
}
