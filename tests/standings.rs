//! Integration tests for standings calculation and aggregation.

mod common;

use common::{line, tourney_js, Line};
use player_sync::{
    aggregate_standings, calculate_standings, parse_tournament, rank_standings, ByePolicy,
    StandingsAggregator, StandingsRecord, SyncError, TournamentDocument,
};

fn standings(players: &[Line<'_>], policy: ByePolicy) -> Vec<StandingsRecord> {
    let doc = parse_tournament(&tourney_js(players)).unwrap();
    calculate_standings(&doc, "a", policy).unwrap()
}

fn record(name: &str, wins: f64, losses: f64, spread: i64) -> StandingsRecord {
    StandingsRecord {
        name: name.to_string(),
        wins,
        losses,
        spread,
        games_played: 3,
        ..StandingsRecord::default()
    }
}

#[test]
fn win_then_tie() {
    let s = standings(
        &[line("A", &[400, 300], &[2, 2]), line("B", &[350, 300], &[1, 1])],
        ByePolicy::Scored,
    );
    assert_eq!((s[0].wins, s[0].losses, s[0].spread, s[0].games_played), (1.5, 0.5, 50, 2));
    assert_eq!((s[1].wins, s[1].losses, s[1].spread, s[1].games_played), (0.5, 1.5, -50, 2));
    assert_eq!(s[0].division, "a");
    assert_eq!(s[0].id, 1);
}

#[test]
fn unplayed_rounds_are_skipped() {
    let s = standings(
        &[line("A", &[400, 0, 0], &[2, 0, 0]), line("B", &[350, 0, 0], &[1, 0, 0])],
        ByePolicy::Scored,
    );
    assert_eq!(s[0].games_played, 1);
    assert_eq!(s[1].games_played, 1);
}

#[test]
fn excluded_bye_only_counts_the_game() {
    let s = standings(&[line("A", &[50], &[0])], ByePolicy::Excluded);
    assert_eq!((s[0].wins, s[0].losses, s[0].spread, s[0].games_played), (0.0, 0.0, 0, 1));
}

#[test]
fn scored_bye_is_a_win_with_spread() {
    let s = standings(&[line("A", &[50], &[0])], ByePolicy::Scored);
    assert_eq!((s[0].wins, s[0].losses, s[0].spread, s[0].games_played), (1.0, 0.0, 50, 1));
}

#[test]
fn forfeit_is_a_loss_under_both_policies() {
    for policy in [ByePolicy::Scored, ByePolicy::Excluded] {
        let s = standings(&[line("A", &[-50], &[0])], policy);
        assert_eq!((s[0].wins, s[0].losses, s[0].spread, s[0].games_played), (0.0, 1.0, -50, 1));
    }
}

#[test]
fn unknown_opponent_skips_the_round_but_counts_the_game() {
    let s = standings(&[line("A", &[400, 380], &[9, 0])], ByePolicy::Excluded);
    assert_eq!((s[0].wins, s[0].losses, s[0].spread, s[0].games_played), (0.0, 0.0, 0, 2));
}

#[test]
fn out_of_range_float_scores_clamp_instead_of_overflowing() {
    let js = r#"newt={"divisions":[{"players":[undefined,
        {"id":1,"name":"Huge","scores":[1e30,1e30],"pairings":[2,0]},
        {"id":2,"name":"Tiny","scores":[-1e30,0],"pairings":[1,0]}]}]};"#;
    let doc = parse_tournament(js).unwrap();
    let s = calculate_standings(&doc, "a", ByePolicy::Scored).unwrap();
    assert_eq!((s[0].wins, s[0].spread, s[0].games_played), (2.0, i64::MAX, 2));
    assert_eq!((s[1].losses, s[1].spread, s[1].games_played), (1.0, i64::MIN, 1));

    let merged = aggregate_standings(vec![
        ("main".to_string(), vec![s[0].clone()]),
        ("side".to_string(), vec![s[0].clone()]),
    ]);
    assert_eq!(merged[0].record.spread, i64::MAX);
}

#[test]
fn document_without_divisions_fails() {
    let doc = TournamentDocument::default();
    assert_eq!(
        calculate_standings(&doc, "a", ByePolicy::Scored),
        Err(SyncError::MissingDivision)
    );
}

#[test]
fn ranking_orders_by_wins_then_spread() {
    let mut s = vec![
        record("low", 1.0, 2.0, 300),
        record("top", 2.5, 0.5, 10),
        record("mid-high-spread", 2.0, 1.0, 90),
        record("mid-low-spread", 2.0, 1.0, -20),
    ];
    rank_standings(&mut s);
    let order: Vec<&str> = s.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["top", "mid-high-spread", "mid-low-spread", "low"]);
}

#[test]
fn aggregation_merges_names_case_insensitively() {
    let merged = aggregate_standings(vec![
        ("main".to_string(), vec![record("Jane Doe", 2.0, 1.0, 30)]),
        ("side".to_string(), vec![record("jane doe", 1.0, 2.0, -10), record("Bob", 3.0, 0.0, 99)]),
    ]);
    assert_eq!(merged.len(), 2);
    let jane = &merged[0];
    assert_eq!(jane.record.name, "Jane Doe");
    assert_eq!((jane.record.wins, jane.record.losses, jane.record.spread), (3.0, 3.0, 20));
    assert_eq!(jane.record.games_played, 6);
    assert_eq!(jane.tournaments, vec!["main", "side"]);
    assert_eq!(merged[1].tournaments, vec!["side"]);
}

#[test]
fn aggregator_keeps_first_seen_order() {
    let mut agg = StandingsAggregator::new();
    agg.add("main", vec![record("Zed", 1.0, 0.0, 1), record("Amy", 0.0, 1.0, -1)]);
    agg.add("main", vec![record("AMY", 1.0, 0.0, 5)]);
    assert_eq!(agg.len(), 2);
    let names: Vec<String> = agg.into_standings().into_iter().map(|a| a.record.name).collect();
    assert_eq!(names, vec!["Zed", "Amy"]);
}
