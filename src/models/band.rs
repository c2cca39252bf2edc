//! Rating bands configured per event (the `rating_bands` table).

use crate::models::EventId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingBand {
    pub id: i64,
    #[serde(default)]
    pub event_id: Option<EventId>,
    #[serde(default)]
    pub name: Option<String>,
    pub min_rating: i64,
    pub max_rating: i64,
}

impl RatingBand {
    /// Both bounds inclusive.
    pub fn contains(&self, rating: i64) -> bool {
        (self.min_rating..=self.max_rating).contains(&rating)
    }
}

/// First band containing `rating`, if any.
pub fn rating_band(rating: i64, bands: &[RatingBand]) -> Option<&RatingBand> {
    bands.iter().find(|band| band.contains(rating))
}
