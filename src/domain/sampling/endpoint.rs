// Degenerate endpoint substitution
use super::SeriesQuery;
use crate::domain::reading::RawReading;

/// Swap an all-zero terminal point for the nearest real reading on the inner
/// side of the window. The last point is always checked; the first only when
/// `include_first` is set. Length never changes, and a point with no
/// qualifying replacement is kept as-is.
pub fn substitute_degenerate_endpoints<'a>(
    series: &mut [&'a RawReading],
    raw: &'a [RawReading],
    query: &SeriesQuery,
    include_first: bool,
) {
    if let Some(last) = series.last_mut() {
        if last.is_degenerate() {
            let end_ms = query.end.timestamp_millis();
            let replacement = raw
                .iter()
                .filter(|r| r.timestamp < query.end && !r.is_degenerate())
                .min_by_key(|r| end_ms - r.timestamp_ms());
            if let Some(replacement) = replacement {
                tracing::debug!(from = last.id, to = replacement.id, "replaced degenerate last point");
                *last = replacement;
            }
        }
    }

    if !include_first {
        return;
    }

    if let Some(first) = series.first_mut() {
        if first.is_degenerate() {
            let start_ms = query.start.timestamp_millis();
            let replacement = raw
                .iter()
                .filter(|r| r.timestamp > query.start && !r.is_degenerate())
                .min_by_key(|r| r.timestamp_ms() - start_ms);
            if let Some(replacement) = replacement {
                tracing::debug!(from = first.id, to = replacement.id, "replaced degenerate first point");
                *first = replacement;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{at, reading};
    use super::*;

    fn window() -> SeriesQuery {
        SeriesQuery {
            start: at(10, 0, 0),
            end: at(10, 5, 0),
            interval_minutes: 1,
        }
    }

    fn ids(series: &[&RawReading]) -> Vec<i64> {
        series.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_degenerate_last_takes_nearest_before_end() {
        let raw = vec![
            reading(1, 10, 0, 0, 20.0),
            reading(2, 10, 3, 0, 21.0),
            reading(3, 10, 4, 0, 22.0),
            reading(4, 10, 4, 30, 0.0),
            reading(5, 10, 5, 0, 0.0),
        ];
        let mut series = vec![&raw[0], &raw[4]];

        substitute_degenerate_endpoints(&mut series, &raw, &window(), false);

        assert_eq!(ids(&series), vec![1, 3]);
    }

    #[test]
    fn test_degenerate_last_without_candidate_is_kept() {
        let raw = vec![reading(1, 10, 0, 0, 0.0), reading(2, 10, 5, 0, 0.0)];
        let mut series = vec![&raw[0], &raw[1]];

        substitute_degenerate_endpoints(&mut series, &raw, &window(), true);

        assert_eq!(ids(&series), vec![1, 2]);
    }

    #[test]
    fn test_candidate_at_end_is_excluded() {
        let raw = vec![reading(1, 10, 2, 0, 20.0), reading(2, 10, 5, 0, 21.0)];
        let zero = reading(3, 10, 4, 59, 0.0);
        let mut series = vec![&zero];

        substitute_degenerate_endpoints(&mut series, &raw, &window(), false);

        assert_eq!(ids(&series), vec![1]);
    }

    #[test]
    fn test_first_point_rule_is_optional() {
        let raw = vec![
            reading(1, 10, 0, 0, 0.0),
            reading(2, 10, 1, 0, 21.0),
            reading(3, 10, 2, 0, 22.0),
            reading(4, 10, 5, 0, 23.0),
        ];

        let mut without = vec![&raw[0], &raw[3]];
        substitute_degenerate_endpoints(&mut without, &raw, &window(), false);
        assert_eq!(ids(&without), vec![1, 4]);

        let mut with = vec![&raw[0], &raw[3]];
        substitute_degenerate_endpoints(&mut with, &raw, &window(), true);
        assert_eq!(ids(&with), vec![2, 4]);
    }

    #[test]
    fn test_healthy_endpoints_untouched() {
        let raw = vec![reading(1, 10, 0, 0, 20.0), reading(2, 10, 5, 0, 21.0)];
        let mut series = vec![&raw[0], &raw[1]];

        substitute_degenerate_endpoints(&mut series, &raw, &window(), true);

        assert_eq!(ids(&series), vec![1, 2]);
    }

    #[test]
    fn test_substitute_may_repeat_an_existing_point() {
        // The only candidate before the end is already the first point; the
        // series keeps its length and carries it twice.
        let raw = vec![reading(1, 10, 0, 0, 20.0), reading(2, 10, 1, 0, 0.0)];
        let query = SeriesQuery {
            start: at(10, 0, 0),
            end: at(10, 1, 0),
            interval_minutes: 1,
        };
        let mut series = vec![&raw[0], &raw[1]];

        substitute_degenerate_endpoints(&mut series, &raw, &query, true);

        assert_eq!(ids(&series), vec![1, 1]);
    }

    #[test]
    fn test_empty_series() {
        let mut series: Vec<&RawReading> = Vec::new();
        substitute_degenerate_endpoints(&mut series, &[], &window(), true);
        assert!(series.is_empty());
    }
}
