// Deduplication of matched readings by timestamp
use super::MatchedPoint;
use crate::domain::reading::RawReading;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Keep the first reading seen per timestamp, then order ascending.
pub fn deduplicate<'a>(matches: &[MatchedPoint<'a>]) -> Vec<&'a RawReading> {
    let mut seen: HashSet<DateTime<Utc>> = HashSet::with_capacity(matches.len());
    let mut unique: Vec<&'a RawReading> = matches
        .iter()
        .map(|m| m.reading)
        .filter(|r| seen.insert(r.timestamp))
        .collect();
    unique.sort_by_key(|r| r.timestamp);
    unique
}
