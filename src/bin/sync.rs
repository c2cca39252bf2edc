//! Manual sync runs.
//!
//! Usage:
//!   sync players   [event_id] [external_event]
//!   sync standings [event_id]
//!   sync missing   [event_id] [external_event] [--csv PATH]
//!
//! `external_event` is a Cross-Tables event id or a full roster URL and
//! overrides `CROSS_TABLES_URL`. Everything else comes from the environment
//! (see `SyncConfig::from_env`).

use player_sync::{
    division_letter, EventId, HttpFetcher, MissingReport, PlayerEntry, SupabaseStore, SyncConfig,
    SyncContext, SyncError,
};
use std::collections::BTreeMap;
use std::process::ExitCode;

enum Command {
    Players,
    Standings,
    Missing { csv: Option<String> },
}

struct Invocation {
    command: Command,
    event_id: Option<EventId>,
    roster_source: Option<String>,
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} <players|standings|missing> [event_id] [external_event] [--csv PATH]",
        program
    );
    eprintln!("  external_event: Cross-Tables event id or roster URL (overrides CROSS_TABLES_URL)");
}

fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let mut rest = args.iter().skip(1);
    let command = rest.next().ok_or("missing command")?;

    let mut event_id = None;
    let mut roster_source = None;
    let mut csv = None;
    while let Some(arg) = rest.next() {
        if arg == "--csv" {
            csv = Some(rest.next().ok_or("--csv needs a path")?.clone());
        } else if event_id.is_none() {
            event_id = Some(arg.parse().map_err(|_| format!("event_id must be a number, got {}", arg))?);
        } else if roster_source.is_none() {
            roster_source = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument {}", arg));
        }
    }

    let command = match command.as_str() {
        "players" => Command::Players,
        "standings" => Command::Standings,
        "missing" => Command::Missing { csv },
        other => return Err(format!("unknown command {}", other)),
    };
    Ok(Invocation {
        command,
        event_id,
        roster_source,
    })
}

fn print_missing(players: &[PlayerEntry], report: &MissingReport) {
    println!("Total in roster:        {}", players.len());
    println!("Missing from database:  {}", report.missing.len());

    let mut divisions: Vec<u32> = report.missing.iter().map(|p| p.division).collect();
    divisions.sort_unstable();
    divisions.dedup();
    for division in divisions {
        let rows: Vec<&PlayerEntry> = report.missing_in_division(division).collect();
        println!("\nDivision {} ({} missing):", division, rows.len());
        for p in rows {
            println!("  {:<30} {}", p.name, p.rating);
        }
    }

    if report.extra.is_empty() {
        return;
    }
    println!("\n{} players in the database but not in the roster:", report.extra.len());
    let mut by_division: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for p in &report.extra {
        let label = p
            .current_division()
            .and_then(division_letter)
            .map(|c| c.to_ascii_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string());
        by_division.entry(label).or_default().push(p);
    }
    for (label, rows) in by_division {
        println!("Division {} ({} extra):", label, rows.len());
        for p in rows {
            let rating = p.current_rating.map(|r| r.to_string()).unwrap_or_default();
            let dropped = if p.dropped_out { " [DROPPED]" } else { "" };
            println!("  {:<30} {}{}", p.name, rating, dropped);
        }
    }
}

async fn run(command: Command, config: SyncConfig) -> Result<(), SyncError> {
    let store = SupabaseStore::new(&config.supabase_url, &config.supabase_key)?;
    let ctx = SyncContext::new(config, HttpFetcher::new()?, store);

    match command {
        Command::Players => {
            let report = ctx.sync_roster().await?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
        Command::Standings => {
            let report = ctx.sync_standings().await?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
        Command::Missing { csv } => {
            let (players, report) = ctx.missing_players().await?;
            print_missing(&players, &report);
            if let Some(path) = csv {
                let file = std::fs::File::create(&path)
                    .map_err(|e| SyncError::Config(format!("could not create {}: {}", path, e)))?;
                report
                    .write_csv(file)
                    .map_err(|e| SyncError::Config(format!("could not write {}: {}", path, e)))?;
                log::info!("Wrote missing players report to {}", path);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args: Vec<String> = std::env::args().collect();
    let invocation = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{}", msg);
            usage(args.first().map(String::as_str).unwrap_or("sync"));
            return ExitCode::from(1);
        }
    };

    let mut config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };
    if let Some(event_id) = invocation.event_id {
        config.event_id = event_id;
    }
    if let Some(source) = &invocation.roster_source {
        config.set_roster_source(source);
    }

    match run(invocation.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Synchronization failed: {}", e);
            ExitCode::from(1)
        }
    }
}
