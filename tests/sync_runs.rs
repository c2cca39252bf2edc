//! End-to-end sync runs against canned sources and an in-memory store.

mod common;

use common::{band, line, stored, tourney_js, FakeFetcher, MemoryStore};
use player_sync::{
    find_missing_players, http_fallback_url, SyncConfig, SyncContext, SyncError, TournamentSource,
};

const ROSTER_URL: &str = "https://roster.test/entrants?text=1";

const ROSTER: &str = "\
Division 1
SMITH, JOHN        1850
DOE, JANE          1720^
Division 2
WILSON, BOB        1450
Division 3
IGNORED, PERSON    1000
";

fn config() -> SyncConfig {
    SyncConfig {
        event_id: 1,
        cross_tables_url: ROSTER_URL.to_string(),
        sources: vec![
            TournamentSource {
                name: "main".to_string(),
                base_url: "https://tsh.test/main/".to_string(),
                divisions: vec!["a".to_string(), "b".to_string()],
                url_pattern: "{baseUrl}{division}/tourney.js".to_string(),
            },
            TournamentSource {
                name: "side".to_string(),
                base_url: "https://tsh.test/side/".to_string(),
                divisions: vec!["a".to_string()],
                url_pattern: "{baseUrl}{division}/tourney.js".to_string(),
            },
        ],
        ..SyncConfig::default()
    }
}

#[tokio::test]
async fn roster_sync_reports_counts() {
    let store = MemoryStore::with_rows(vec![
        stored(1, "Smith, John", 1800, 1),
        stored(2, "Gone, Player", 1300, 2),
    ])
    .with_bands(vec![band(7, 0, 1499), band(8, 1500, 1799), band(9, 1800, 2400)]);
    let fetcher = FakeFetcher::new().serve(ROSTER_URL, ROSTER);
    let ctx = SyncContext::new(config(), fetcher, store);

    let report = ctx.sync_roster().await.unwrap();

    assert!(report.success);
    assert_eq!(report.players_processed, 3);
    assert_eq!(report.counts.created, 2);
    assert_eq!(report.counts.updated, 1);
    assert_eq!(report.counts.dropouts, 1);
    assert_eq!(report.counts.errors, 0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["playersProcessed"], 3);
    assert_eq!(json["dropouts"], 1);
    assert_eq!(json["notFound"], 0);

    let wilson = ctx.store.row("Wilson, Bob");
    assert_eq!(wilson.current_rating_band_id, Some(7));
    assert_eq!(wilson.extra["original_rating"], 1450);
    assert_eq!(wilson.extra["original_rating_band_id"], 7);
    assert_eq!(ctx.store.row("Smith, John").current_rating_band_id, Some(9));
}

#[tokio::test]
async fn roster_fetch_failure_aborts() {
    let fetcher = FakeFetcher::new().fail(ROSTER_URL, 503);
    let ctx = SyncContext::new(config(), fetcher, MemoryStore::default());
    let err = ctx.sync_roster().await.unwrap_err();
    assert!(matches!(err, SyncError::Fetch { status: Some(503), .. }));
}

#[tokio::test]
async fn empty_roster_never_marks_everyone_dropped() {
    let store = MemoryStore::with_rows(vec![stored(1, "Smith, John", 1800, 1)]);
    let fetcher = FakeFetcher::new().serve(ROSTER_URL, "<html>maintenance</html>");
    let ctx = SyncContext::new(config(), fetcher, store);

    assert!(matches!(ctx.sync_roster().await, Err(SyncError::NoUsableData(_))));
    assert!(!ctx.store.row("Smith, John").dropped_out);
}

#[tokio::test]
async fn standings_sync_aggregates_and_skips_broken_divisions() {
    let main_a = tourney_js(&[
        line("Smith, John", &[400, 300], &[2, 2]),
        line("Doe, Jane", &[350, 300], &[1, 1]),
    ]);
    let side_a = tourney_js(&[
        line("SMITH, JOHN", &[420], &[2]),
        line("Unknown Guest", &[380], &[1]),
    ]);
    let fetcher = FakeFetcher::new()
        .serve("https://tsh.test/main/a/tourney.js", main_a)
        .serve("https://tsh.test/main/b/tourney.js", "var nothing = 1;")
        .serve("https://tsh.test/side/a/tourney.js", side_a);
    let store = MemoryStore::with_rows(vec![
        stored(1, "Smith, John", 1850, 1),
        stored(2, "Doe, Jane", 1720, 1),
    ]);
    let ctx = SyncContext::new(config(), fetcher, store);

    let report = ctx.sync_standings().await.unwrap();

    assert_eq!(report.divisions_processed, 2);
    assert_eq!(report.division_errors, 1);
    assert_eq!(report.total_players, 3);
    assert_eq!(report.counts.updated, 2);
    assert_eq!(report.counts.not_found, 1);

    let smith = ctx.store.row("Smith, John");
    assert_eq!(smith.tournament_wins, Some(2.5));
    assert_eq!(smith.tournament_losses, Some(0.5));
    assert_eq!(smith.tournament_spread, Some(90));
    assert_eq!(smith.tournament_games_played, Some(3));
    assert_eq!(smith.current_rating, Some(1850));
}

#[tokio::test]
async fn standings_sync_without_any_division_fails() {
    let fetcher = FakeFetcher::new().fail("https://tsh.test/main/a/tourney.js", 500);
    let ctx = SyncContext::new(config(), fetcher, MemoryStore::default());

    let err = ctx.sync_standings().await.unwrap_err();
    assert!(matches!(err, SyncError::NoUsableData(_)));
    assert!(ctx.store.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_report_lists_both_sides() {
    let mut dropped = stored(3, "Withdrawn, Will", 1200, 2);
    dropped.dropped_out = true;
    let store = MemoryStore::with_rows(vec![stored(1, "smith, john", 1850, 1), dropped]);
    let fetcher = FakeFetcher::new().serve(ROSTER_URL, ROSTER);
    let ctx = SyncContext::new(config(), fetcher, store);

    let (players, report) = ctx.missing_players().await.unwrap();
    assert_eq!(players.len(), 3);
    let missing: Vec<&str> = report.missing.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(missing, vec!["DOE, JANE", "WILSON, BOB"]);
    assert_eq!(report.missing_in_division(2).count(), 1);
    assert_eq!(report.extra.len(), 1);

    let mut csv = Vec::new();
    report.write_csv(&mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "side,name,rating,division,dropped_out");
    assert_eq!(lines[1], "missing,\"DOE, JANE\",1720,1,false");
    assert_eq!(lines[3], "extra,\"Withdrawn, Will\",1200,2,true");
}

#[test]
fn empty_missing_report_still_has_a_header() {
    let report = find_missing_players(&[], &[]);
    assert!(report.is_empty());
    let mut csv = Vec::new();
    report.write_csv(&mut csv).unwrap();
    assert_eq!(String::from_utf8(csv).unwrap(), "side,name,rating,division,dropped_out\n");
}

#[test]
fn plain_http_fallback_only_for_https() {
    assert_eq!(
        http_fallback_url("https://tsh.test/a/tourney.js").as_deref(),
        Some("http://tsh.test/a/tourney.js")
    );
    assert_eq!(http_fallback_url("http://tsh.test/a/tourney.js"), None);
}
