//! Merge per-division standings from every source into one row per player name.

use crate::models::{name_key, AggregatedStanding, StandingsRecord};
use std::collections::HashMap;

/// Accumulates standings keyed by case-insensitive name, in first-seen order.
///
/// Two different people with the same name collapse into one row; names are
/// assumed unique within an event.
#[derive(Clone, Debug, Default)]
pub struct StandingsAggregator {
    rows: Vec<AggregatedStanding>,
    index: HashMap<String, usize>,
}

impl StandingsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one division's standings from the named source.
    pub fn add(&mut self, source: &str, records: impl IntoIterator<Item = StandingsRecord>) {
        for record in records {
            let key = name_key(&record.name);
            match self.index.get(&key) {
                Some(&pos) => self.rows[pos].absorb(&record, source),
                None => {
                    self.index.insert(key, self.rows.len());
                    self.rows.push(AggregatedStanding::new(record, source));
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_standings(self) -> Vec<AggregatedStanding> {
        self.rows
    }
}

/// One-shot merge of `(source name, records)` pairs.
pub fn aggregate_standings<I, R>(sources: I) -> Vec<AggregatedStanding>
where
    I: IntoIterator<Item = (String, R)>,
    R: IntoIterator<Item = StandingsRecord>,
{
    let mut aggregator = StandingsAggregator::new();
    for (source, records) in sources {
        aggregator.add(&source, records);
    }
    aggregator.into_standings()
}
