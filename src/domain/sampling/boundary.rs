// Boundary enforcement - keep the requested edges represented
use super::MatchedPoint;
use crate::domain::reading::RawReading;
use chrono::{DateTime, Utc};

/// For each bound with no match within `window_ms`, append the closest
/// reading from the whole raw set, ignoring tolerance and claims.
///
/// This may bind a reading that a grid instant already claimed; the
/// deduplication stage resolves that.
pub fn enforce_boundaries<'a>(
    matches: &mut Vec<MatchedPoint<'a>>,
    raw: &'a [RawReading],
    bounds: [DateTime<Utc>; 2],
    window_ms: i64,
) {
    for bound in bounds {
        let covered = matches
            .iter()
            .any(|m| distance_ms(m.reading, bound) <= window_ms);
        if covered {
            continue;
        }

        // min_by_key keeps the first of equal keys, so earlier readings win ties.
        if let Some(reading) = raw.iter().min_by_key(|r| distance_ms(r, bound)) {
            matches.push(MatchedPoint {
                target: bound,
                reading,
            });
        }
    }
}

fn distance_ms(reading: &RawReading, instant: DateTime<Utc>) -> i64 {
    (reading.timestamp_ms() - instant.timestamp_millis()).abs()
}
