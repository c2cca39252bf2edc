//! `PlayerStore` over a PostgREST endpoint (Supabase `rest/v1`).

use crate::models::{EventId, NewPlayer, PlayerPatch, RatingBand, StoredPlayer, SyncError};
use crate::store::PlayerStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const PLAYERS: &str = "players";
const RATING_BANDS: &str = "rating_bands";

/// Service-role client for the `players` table.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Store(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, SyncError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| SyncError::Store(format!("{}: {}", what, e)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SyncError::Store(format!("{}: status {} {}", what, status.as_u16(), body)))
    }
}

#[async_trait]
impl PlayerStore for SupabaseStore {
    async fn fetch_players(&self, event_id: EventId) -> Result<Vec<StoredPlayer>, SyncError> {
        let request = self
            .client
            .get(self.table_url(PLAYERS))
            .query(&[("event_id", format!("eq.{}", event_id)), ("select", "*".to_string())]);
        let response = self.send(request, "fetching existing players").await?;
        response
            .json()
            .await
            .map_err(|e| SyncError::Store(format!("decoding existing players: {}", e)))
    }

    async fn fetch_rating_bands(&self, event_id: EventId) -> Result<Vec<RatingBand>, SyncError> {
        let request = self
            .client
            .get(self.table_url(RATING_BANDS))
            .query(&[("event_id", format!("eq.{}", event_id)), ("select", "*".to_string())]);
        let response = self.send(request, "fetching rating bands").await?;
        response
            .json()
            .await
            .map_err(|e| SyncError::Store(format!("decoding rating bands: {}", e)))
    }

    async fn insert_players(&self, players: &[NewPlayer]) -> Result<(), SyncError> {
        let request = self
            .client
            .post(self.table_url(PLAYERS))
            .header("Prefer", "return=minimal")
            .json(players);
        self.send(request, "inserting players").await?;
        Ok(())
    }

    async fn update_player(&self, patch: &PlayerPatch) -> Result<(), SyncError> {
        let request = self
            .client
            .patch(self.table_url(PLAYERS))
            .query(&[("id", format!("eq.{}", patch.id))])
            .header("Prefer", "return=minimal")
            .json(patch);
        self.send(request, &format!("updating {}", patch.name)).await?;
        Ok(())
    }

    async fn upsert_players(&self, players: &[StoredPlayer]) -> Result<usize, SyncError> {
        let request = self
            .client
            .post(self.table_url(PLAYERS))
            .query(&[("on_conflict", "id"), ("select", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(players);
        let response = self.send(request, "upserting players").await?;
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| SyncError::Store(format!("decoding upsert result: {}", e)))?;
        Ok(rows.len())
    }
}
