//! Resampling engine: turns an irregular, ascending sequence of readings into
//! a regular series for charting.
//!
//! The stages run strictly in order and each one is a plain function over
//! data already fetched, so a request owns its whole working set:
//!
//! 1. [`grid::generate_grid`] lays out the target instants.
//! 2. [`matcher::match_nearest`] binds at most one unclaimed reading to each
//!    instant within the tolerance window.
//! 3. [`boundary::enforce_boundaries`] makes sure `start` and `end` are
//!    represented even when the tolerance left them empty.
//! 4. [`dedup::deduplicate`] collapses the matches to unique timestamps.
//! 5. [`endpoint::substitute_degenerate_endpoints`] swaps all-zero terminal
//!    points for the nearest real observation.
//!
//! No stage ever synthesizes a value; every output point is a stored reading.
pub mod boundary;
pub mod dedup;
pub mod endpoint;
pub mod grid;
pub mod matcher;

use crate::domain::reading::RawReading;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const DEFAULT_TOLERANCE_MS: i64 = 30_000;
pub const DEFAULT_BOUNDARY_WINDOW_MS: i64 = 1_000;
pub const DEFAULT_MAX_GRID_POINTS: usize = 100_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("interval must be a positive number of minutes, got {0}")]
    InvalidInterval(i64),
    #[error("requested window needs {points} grid points, limit is {limit}")]
    GridTooLarge { points: i64, limit: usize },
}

/// Requested window and grid step. `start < end` is validated upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval_minutes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingOptions {
    pub tolerance_ms: i64,
    pub boundary_window_ms: i64,
    pub substitute_first_endpoint: bool,
    pub max_grid_points: usize,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            tolerance_ms: DEFAULT_TOLERANCE_MS,
            boundary_window_ms: DEFAULT_BOUNDARY_WINDOW_MS,
            substitute_first_endpoint: true,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
        }
    }
}

/// A reading bound to the instant it represents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedPoint<'a> {
    pub target: DateTime<Utc>,
    pub reading: &'a RawReading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampledSeries {
    pub points: Vec<RawReading>,
    pub original_count: usize,
    pub grid_len: usize,
}

/// Run the full pipeline over one request's raw readings.
pub fn resample(
    mut raw: Vec<RawReading>,
    query: &SeriesQuery,
    options: &SamplingOptions,
) -> Result<SampledSeries, SamplingError> {
    let grid = grid::generate_grid(query, options.max_grid_points)?;

    // Already ascending per the fetch contract; a stable sort keeps tie order.
    raw.sort_by_key(|r| r.timestamp);
    let original_count = raw.len();

    let mut matches = matcher::match_nearest(&grid, &raw, options.tolerance_ms);
    let regular = matches.len();
    boundary::enforce_boundaries(
        &mut matches,
        &raw,
        [query.start, query.end],
        options.boundary_window_ms,
    );

    let mut points = dedup::deduplicate(&matches);
    endpoint::substitute_degenerate_endpoints(
        &mut points,
        &raw,
        query,
        options.substitute_first_endpoint,
    );

    tracing::debug!(
        grid = grid.len(),
        regular,
        boundary = matches.len() - regular,
        sampled = points.len(),
        original = original_count,
        "resampled series"
    );

    Ok(SampledSeries {
        points: points.into_iter().cloned().collect(),
        original_count,
        grid_len: grid.len(),
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::{at, reading};
    use super::*;

    fn query(start: DateTime<Utc>, end: DateTime<Utc>, interval_minutes: i64) -> SeriesQuery {
        SeriesQuery {
            start,
            end,
            interval_minutes,
        }
    }

    fn summary(series: &SampledSeries) -> Vec<(DateTime<Utc>, f64)> {
        series.points.iter().map(|r| (r.timestamp, r.values[0])).collect()
    }

    #[test]
    fn test_degenerate_tail_is_replaced_by_nearest_real_reading() {
        let raw = vec![
            reading(1, 10, 0, 0, 20.0),
            reading(2, 10, 0, 20, 21.0),
            reading(3, 10, 1, 5, 0.0),
        ];
        let q = query(at(10, 0, 0), at(10, 1, 5), 1);

        let series = resample(raw, &q, &SamplingOptions::default()).unwrap();

        assert_eq!(series.grid_len, 2);
        assert_eq!(
            summary(&series),
            vec![(at(10, 0, 0), 20.0), (at(10, 0, 20), 21.0)]
        );
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.original_count, 3);
    }

    #[test]
    fn test_degenerate_tail_may_repeat_the_head() {
        let raw = vec![reading(1, 10, 0, 0, 20.0), reading(2, 10, 1, 0, 0.0)];
        let q = query(at(10, 0, 0), at(10, 1, 0), 1);

        let series = resample(raw, &q, &SamplingOptions::default()).unwrap();

        assert_eq!(
            summary(&series),
            vec![(at(10, 0, 0), 20.0), (at(10, 0, 0), 20.0)]
        );
        assert!(series.points.iter().all(|r| r.id == 1));
    }

    #[test]
    fn test_sparse_edges_collapse_to_single_boundary_reading() {
        let raw = vec![reading(7, 10, 0, 45, 30.0)];
        let q = query(at(10, 0, 0), at(10, 2, 0), 1);

        let series = resample(raw, &q, &SamplingOptions::default()).unwrap();

        assert_eq!(series.grid_len, 3);
        assert_eq!(summary(&series), vec![(at(10, 0, 45), 30.0)]);
        assert_eq!(series.points[0].id, 7);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let raw: Vec<RawReading> = (0..120)
            .map(|i| {
                let secs = i * 37;
                reading(i as i64, 10 + secs / 3600, (secs / 60) % 60, secs % 60, (i % 5) as f64)
            })
            .collect();
        let q = query(at(10, 0, 0), at(11, 0, 0), 5);
        let options = SamplingOptions::default();

        let first = resample(raw.clone(), &q, &options).unwrap();
        let second = resample(raw, &q, &options).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_output_is_strictly_increasing_and_bounded() {
        let raw: Vec<RawReading> = (0..200)
            .map(|i| {
                let secs = i * 17 + (i % 3) * 4;
                reading(i as i64, 10 + secs / 3600, (secs / 60) % 60, secs % 60, 10.0 + i as f64)
            })
            .collect();
        let q = query(at(10, 0, 0), at(10, 55, 0), 2);

        let series = resample(raw, &q, &SamplingOptions::default()).unwrap();

        assert!(series.points.len() <= series.grid_len + 2);
        assert!(series.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_unsorted_input_is_ordered_before_matching() {
        let raw = vec![reading(2, 10, 1, 0, 21.0), reading(1, 10, 0, 0, 20.0)];
        let q = query(at(10, 0, 0), at(10, 1, 0), 1);

        let series = resample(raw, &q, &SamplingOptions::default()).unwrap();

        assert_eq!(
            summary(&series),
            vec![(at(10, 0, 0), 20.0), (at(10, 1, 0), 21.0)]
        );
    }

    #[test]
    fn test_invalid_interval_is_rejected() {
        let q = query(at(10, 0, 0), at(10, 1, 0), 0);
        assert_eq!(
            resample(vec![], &q, &SamplingOptions::default()),
            Err(SamplingError::InvalidInterval(0))
        );
    }
}
