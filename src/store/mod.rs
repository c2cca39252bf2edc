//! The external `players` table, behind a trait so runs can be pointed at any backend.

mod supabase;

pub use supabase::SupabaseStore;

use crate::models::{EventId, NewPlayer, PlayerPatch, RatingBand, StoredPlayer, SyncError};
use async_trait::async_trait;

/// Operations the sync needs from the player store.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Every row for the event (the snapshot a run reconciles against).
    async fn fetch_players(&self, event_id: EventId) -> Result<Vec<StoredPlayer>, SyncError>;

    /// Rating bands configured for the event; empty when it has none.
    async fn fetch_rating_bands(&self, event_id: EventId) -> Result<Vec<RatingBand>, SyncError>;

    /// Bulk insert; all rows succeed or the call fails.
    async fn insert_players(&self, players: &[NewPlayer]) -> Result<(), SyncError>;

    /// Write only the fields set on the patch to row `patch.id`.
    async fn update_player(&self, patch: &PlayerPatch) -> Result<(), SyncError>;

    /// Insert-or-replace whole rows by `id`. Returns the number of rows written.
    async fn upsert_players(&self, players: &[StoredPlayer]) -> Result<usize, SyncError>;
}
