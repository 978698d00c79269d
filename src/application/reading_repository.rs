// Repository trait for sensor reading storage
use crate::domain::reading::RawReading;
use crate::domain::series::SeriesSpec;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Whether a live store connection exists right now
    async fn is_available(&self) -> bool;

    /// All readings with `start <= timestamp <= end`, ascending by timestamp,
    /// fully materialized
    async fn fetch_range(
        &self,
        series: &SeriesSpec,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RawReading>>;

    /// Most recent reading of a series
    async fn fetch_latest(&self, series: &SeriesSpec) -> anyhow::Result<Option<RawReading>>;

    /// Append one row stamped with the store's current time; returns its id
    async fn insert(&self, series: &SeriesSpec, values: &[f64]) -> anyhow::Result<i64>;
}
