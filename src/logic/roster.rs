//! Roster text parsing: entrant listing -> `PlayerEntry` per player line.

use crate::config::RosterFormat;
use crate::models::{parse_division_token, DivisionId, PlayerEntry};
use regex::Regex;
use std::sync::OnceLock;

fn division_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Division\s+([A-Z\d]+)").expect("valid header pattern"))
}

fn player_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?)\s+(\d+)[^\d]*\s*$").expect("valid player pattern"))
}

/// Parse roster text in the given format.
pub fn parse_roster(text: &str, format: RosterFormat, max_divisions: u32) -> Vec<PlayerEntry> {
    match format {
        RosterFormat::Headed => parse_headed_roster(text, max_divisions),
        RosterFormat::Positional => parse_positional_roster(text),
    }
}

/// Parse a roster whose divisions start with `Division <n|letter>` headers.
///
/// Lines before the first header, and lines under a header whose token is not
/// a division (`Division 0`, `Division 2A`), are ignored. The first header numbered above
/// `max_divisions` stops parsing: nothing after it is returned, whatever
/// division later lines belong to.
pub fn parse_headed_roster(text: &str, max_divisions: u32) -> Vec<PlayerEntry> {
    let mut players = Vec::new();
    let mut current: Option<DivisionId> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = division_header().captures(line) {
            let token = &caps[1];
            let Some(division) = parse_division_token(token) else {
                log::warn!("Unrecognised division header {:?}, skipping its players", line);
                current = None;
                continue;
            };
            if division > max_divisions {
                log::info!(
                    "Reached Division {} ({}), stopping at max divisions {}",
                    token,
                    division,
                    max_divisions
                );
                break;
            }
            log::debug!("Found division header: Division {} -> {}", token, division);
            current = Some(division);
            continue;
        }

        let Some(division) = current else {
            continue;
        };
        if let Some(entry) = parse_player_line(line, division) {
            players.push(entry);
        }
    }

    players
}

/// Parse a header-less roster: division 1 until the first blank line,
/// division 2 until the next blank line, then stop.
pub fn parse_positional_roster(text: &str) -> Vec<PlayerEntry> {
    let mut players = Vec::new();
    let mut division: DivisionId = 1;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if division == 1 {
                log::debug!("Blank line, moving to division 2");
                division = 2;
                continue;
            }
            log::debug!("Blank line, end of division 2");
            break;
        }
        if let Some(entry) = parse_player_line(line, division) {
            players.push(entry);
        }
    }

    players
}

/// Match `name<whitespace>rating[trailing symbols]`. Non-matching lines yield `None`.
pub fn parse_player_line(line: &str, division: DivisionId) -> Option<PlayerEntry> {
    let Some(caps) = player_line().captures(line) else {
        log::debug!("Could not parse line: {:?}", line);
        return None;
    };
    let Ok(rating) = caps[2].parse::<u32>() else {
        log::debug!("Rating out of range on line: {:?}", line);
        return None;
    };
    let entry = PlayerEntry::new(&caps[1], rating, division);
    log::debug!("Parsed: {} ({}) - Division {}", entry.name, entry.rating, entry.division);
    Some(entry)
}
