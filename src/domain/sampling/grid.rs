// Grid generation - regular target instants for a requested window
use super::{SamplingError, SeriesQuery};
use chrono::{DateTime, Duration, Utc};

const MS_PER_MINUTE: i64 = 60_000;

/// Number of instants `generate_grid` would produce, without building them.
///
/// Fails on a non-positive interval or when the grid exceeds `max_points`.
pub fn grid_len(query: &SeriesQuery, max_points: usize) -> Result<usize, SamplingError> {
    if query.interval_minutes <= 0 {
        return Err(SamplingError::InvalidInterval(query.interval_minutes));
    }

    let span_ms = (query.end - query.start).num_milliseconds();
    if span_ms < 0 {
        return Ok(0);
    }

    // An interval too large to represent in ms cannot fit twice in any window.
    let points = match step_ms(query) {
        Some(step) => span_ms / step + 1,
        None => 1,
    };
    if points > max_points as i64 {
        return Err(SamplingError::GridTooLarge {
            points,
            limit: max_points,
        });
    }
    Ok(points as usize)
}

/// `start, start + Δ, start + 2Δ, …` while `<= end`.
///
/// `end` is only part of the grid when the window is an exact multiple of
/// the interval; the boundary stage covers it otherwise.
pub fn generate_grid(
    query: &SeriesQuery,
    max_points: usize,
) -> Result<Vec<DateTime<Utc>>, SamplingError> {
    let len = grid_len(query, max_points)? as i64;
    // Only the first instant is produced when the step overflows.
    let step = step_ms(query).unwrap_or(0);

    Ok((0..len)
        .map(|i| query.start + Duration::milliseconds(i * step))
        .collect())
}

fn step_ms(query: &SeriesQuery) -> Option<i64> {
    query.interval_minutes.checked_mul(MS_PER_MINUTE)
}
