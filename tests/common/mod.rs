//! Test doubles: an in-memory player store and a canned source fetcher.

#![allow(dead_code)]

use async_trait::async_trait;
use player_sync::{
    EventId, NewPlayer, PlayerId, PlayerPatch, PlayerStore, RatingBand, SourceFetcher,
    StoredPlayer, SyncError,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Players table held in memory, with optional injected write failures.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredPlayer>>,
    next_id: Mutex<PlayerId>,
    bands: Vec<RatingBand>,
    failing_ids: HashSet<PlayerId>,
    fail_inserts: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<StoredPlayer>) -> Self {
        let next = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            rows: Mutex::new(rows),
            next_id: Mutex::new(next),
            ..Self::default()
        }
    }

    /// Updates and upserts touching these ids fail.
    pub fn failing_on(mut self, ids: &[PlayerId]) -> Self {
        self.failing_ids = ids.iter().copied().collect();
        self
    }

    pub fn with_bands(mut self, bands: Vec<RatingBand>) -> Self {
        self.bands = bands;
        self
    }

    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    pub fn rows(&self) -> Vec<StoredPlayer> {
        self.rows.lock().unwrap().clone()
    }

    pub fn row(&self, name: &str) -> StoredPlayer {
        self.rows()
            .into_iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .unwrap_or_else(|| panic!("no row named {}", name))
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn fetch_players(&self, event_id: EventId) -> Result<Vec<StoredPlayer>, SyncError> {
        self.record("fetch");
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| r.event_id.map_or(true, |e| e == event_id))
            .collect())
    }

    async fn fetch_rating_bands(&self, event_id: EventId) -> Result<Vec<RatingBand>, SyncError> {
        self.record("fetch bands");
        Ok(self
            .bands
            .iter()
            .filter(|b| b.event_id.map_or(true, |e| e == event_id))
            .cloned()
            .collect())
    }

    async fn insert_players(&self, players: &[NewPlayer]) -> Result<(), SyncError> {
        self.record(format!("insert {}", players.len()));
        if self.fail_inserts {
            return Err(SyncError::Store("insert rejected".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        for p in players {
            let mut row = StoredPlayer::new(*next_id, p.name.clone());
            *next_id += 1;
            row.event_id = Some(p.event_id);
            row.current_rating = Some(p.current_rating);
            row.current_rating_band_id = p.current_rating_band_id;
            row.set_current_division(p.current_division);
            row.extra.insert("original_rating".to_string(), Value::from(p.original_rating));
            row.extra.insert(
                "original_rating_band_id".to_string(),
                p.original_rating_band_id.map_or(Value::Null, Value::from),
            );
            row.is_active = p.is_active;
            row.dropped_out = p.dropped_out;
            rows.push(row);
        }
        Ok(())
    }

    async fn update_player(&self, patch: &PlayerPatch) -> Result<(), SyncError> {
        self.record(format!("update {}", patch.id));
        if self.failing_ids.contains(&patch.id) {
            return Err(SyncError::Store(format!("update {} rejected", patch.id)));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == patch.id)
            .ok_or_else(|| SyncError::Store(format!("no row {}", patch.id)))?;
        row.apply_patch(patch);
        Ok(())
    }

    async fn upsert_players(&self, players: &[StoredPlayer]) -> Result<usize, SyncError> {
        self.record(format!("upsert {}", players.len()));
        if players.iter().any(|p| self.failing_ids.contains(&p.id)) {
            return Err(SyncError::Store("upsert rejected".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        for p in players {
            match rows.iter_mut().find(|r| r.id == p.id) {
                Some(row) => *row = p.clone(),
                None => rows.push(p.clone()),
            }
        }
        Ok(players.len())
    }
}

/// Serves fixed bodies by URL; unknown URLs fail with 404.
#[derive(Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Result<String, u16>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: impl Into<String>) -> Self {
        self.bodies.insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn fail(mut self, url: &str, status: u16) -> Self {
        self.bodies.insert(url.to_string(), Err(status));
        self
    }
}

#[async_trait]
impl SourceFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, SyncError> {
        match self.bodies.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(SyncError::Fetch {
                url: url.to_string(),
                status: Some(*status),
                message: "canned failure".to_string(),
            }),
            None => Err(SyncError::Fetch {
                url: url.to_string(),
                status: Some(404),
                message: "not served".to_string(),
            }),
        }
    }
}

/// A stored row with rating and division set.
pub fn stored(id: PlayerId, name: &str, rating: i64, division: u32) -> StoredPlayer {
    let mut row = StoredPlayer::new(id, name);
    row.event_id = Some(1);
    row.current_rating = Some(rating);
    row.set_current_division(division);
    row
}

pub fn band(id: i64, min_rating: i64, max_rating: i64) -> RatingBand {
    RatingBand {
        id,
        event_id: Some(1),
        name: Some(format!("Band {}", id)),
        min_rating,
        max_rating,
    }
}

/// One player of a generated division: (name, scores, pairings).
pub type Line<'a> = (&'a str, &'a [i64], &'a [u32]);

pub fn line<'a>(name: &'a str, scores: &'a [i64], pairings: &'a [u32]) -> Line<'a> {
    (name, scores, pairings)
}

/// `newt={...};` script for one division.
pub fn tourney_js(players: &[Line<'_>]) -> String {
    let mut entries = vec!["undefined".to_string()];
    for (idx, (name, scores, pairings)) in players.iter().enumerate() {
        entries.push(format!(
            r#"{{"id":{},"name":"{}","rating":1500,"scores":{:?},"pairings":{:?}}}"#,
            idx + 1,
            name,
            scores,
            pairings
        ));
    }
    format!(
        "newt={{\"config\":{{\"event_name\":\"Test\"}},\"divisions\":[{{\"name\":\"a\",\"players\":[{}]}}]}};\n",
        entries.join(",")
    )
}
