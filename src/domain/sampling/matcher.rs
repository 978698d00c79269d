// Nearest-neighbor matching of raw readings onto grid instants
use super::MatchedPoint;
use crate::domain::reading::RawReading;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Bind each grid instant to the closest unclaimed reading within
/// `tolerance_ms`, or drop the instant when none qualifies.
///
/// `raw` must be ascending by timestamp. Only the tolerance window around
/// each target is scanned; a candidate replaces the current best only on a
/// strict improvement, so the earliest reading wins exact ties. A reading,
/// keyed by its timestamp, is claimed at most once across the whole grid.
pub fn match_nearest<'a>(
    grid: &[DateTime<Utc>],
    raw: &'a [RawReading],
    tolerance_ms: i64,
) -> Vec<MatchedPoint<'a>> {
    let mut claimed: HashSet<DateTime<Utc>> = HashSet::new();
    let mut matches = Vec::with_capacity(grid.len());

    for &target in grid {
        let target_ms = target.timestamp_millis();
        let lo = raw.partition_point(|r| r.timestamp_ms() < target_ms - tolerance_ms);
        let hi = raw.partition_point(|r| r.timestamp_ms() <= target_ms + tolerance_ms);

        let mut best: Option<(&RawReading, i64)> = None;
        for reading in &raw[lo..hi] {
            if claimed.contains(&reading.timestamp) {
                continue;
            }
            let diff = (reading.timestamp_ms() - target_ms).abs();
            match best {
                Some((_, min_diff)) if diff >= min_diff => {}
                _ => best = Some((reading, diff)),
            }
        }

        if let Some((reading, _)) = best {
            claimed.insert(reading.timestamp);
            matches.push(MatchedPoint { target, reading });
        }
    }

    matches
}
