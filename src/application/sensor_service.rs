// Sensor service - Ingestion, range queries and resampled series
use crate::application::error::ServiceError;
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::{IngestBand, RawReading};
use crate::domain::sampling::{self, SampledSeries, SamplingOptions, SeriesQuery};
use crate::domain::series::{SeriesCatalog, SeriesSpec};
use crate::domain::time::{is_date_shaped, validate_range, RangeError};
use chrono::FixedOffset;
use serde_json::Value;
use std::sync::Arc;

pub const DAY_START: &str = "00:00:00";
pub const DAY_END: &str = "23:59:59";

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Stored(i64),
    /// Missing, non-numeric or out-of-band value; the row was not written
    Discarded,
}

#[derive(Debug, Clone)]
pub struct DailyReadings {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub readings: Vec<RawReading>,
}

#[derive(Debug, Clone)]
pub struct SampleResult {
    pub query: SeriesQuery,
    pub series: SampledSeries,
}

#[derive(Clone)]
pub struct SensorService {
    repository: Arc<dyn ReadingRepository>,
    catalog: Arc<SeriesCatalog>,
    sampling: SamplingOptions,
    ingest_band: IngestBand,
    default_interval_minutes: i64,
    local: FixedOffset,
}

impl SensorService {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        catalog: SeriesCatalog,
        sampling: SamplingOptions,
        ingest_band: IngestBand,
        default_interval_minutes: i64,
        local: FixedOffset,
    ) -> Self {
        Self {
            repository,
            catalog: Arc::new(catalog),
            sampling,
            ingest_band,
            default_interval_minutes,
            local,
        }
    }

    pub async fn store_available(&self) -> bool {
        self.repository.is_available().await
    }

    pub fn resolve(&self, name: &str) -> Result<&SeriesSpec, ServiceError> {
        self.catalog
            .get(name)
            .ok_or_else(|| ServiceError::NotFound(format!("Unknown series {}", name)))
    }

    pub async fn ingest(
        &self,
        series: &SeriesSpec,
        payload: &Value,
    ) -> Result<IngestOutcome, ServiceError> {
        let raw: Vec<Option<f64>> = series
            .columns()
            .iter()
            .map(|col| payload.get(col).and_then(numeric))
            .collect();

        let Some(values) = self.ingest_band.accept(&raw) else {
            tracing::debug!(series = %series.name, "discarding reading outside accepted band");
            return Ok(IngestOutcome::Discarded);
        };

        let id = self.repository.insert(series, &values).await?;
        Ok(IngestOutcome::Stored(id))
    }

    pub async fn range(
        &self,
        series: &SeriesSpec,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<Vec<RawReading>, ServiceError> {
        let (start, end) = validate_range(start_time, end_time, &self.local)?;
        Ok(self.repository.fetch_range(series, start, end).await?)
    }

    pub async fn daily(
        &self,
        series: &SeriesSpec,
        date: Option<&str>,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<DailyReadings, ServiceError> {
        let date = date
            .filter(|d| is_date_shaped(d))
            .ok_or(RangeError::InvalidDate)?;
        let start_time = start_time.unwrap_or(DAY_START);
        let end_time = end_time.unwrap_or(DAY_END);

        let day_start = format!("{} {}", date, start_time);
        let day_end = format!("{} {}", date, end_time);
        let (start, end) = validate_range(Some(day_start.as_str()), Some(day_end.as_str()), &self.local)?;
        let readings = self.repository.fetch_range(series, start, end).await?;

        Ok(DailyReadings {
            date: date.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            readings,
        })
    }

    pub async fn latest(&self, series: &SeriesSpec) -> Result<RawReading, ServiceError> {
        self.repository
            .fetch_latest(series)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No data found in table {}", series.name)))
    }

    pub async fn sample(
        &self,
        series: &SeriesSpec,
        start_time: Option<&str>,
        end_time: Option<&str>,
        interval: Option<&str>,
    ) -> Result<SampleResult, ServiceError> {
        let (start, end) = validate_range(start_time, end_time, &self.local)?;
        let interval_minutes = match interval {
            None => self.default_interval_minutes,
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                ServiceError::Validation(format!("Invalid interval {:?}", raw))
            })?,
        };
        let query = SeriesQuery {
            start,
            end,
            interval_minutes,
        };
        // Reject a bad interval or oversized grid before touching the store.
        sampling::grid::grid_len(&query, self.sampling.max_grid_points)?;

        let raw = self.repository.fetch_range(series, start, end).await?;
        if raw.is_empty() {
            return Err(ServiceError::NotFound("No data found".to_string()));
        }

        let sampled = sampling::resample(raw, &query, &self.sampling)?;
        tracing::info!(
            series = %series.name,
            interval_minutes,
            grid = sampled.grid_len,
            sampled = sampled.points.len(),
            original = sampled.original_count,
            "sampled series"
        );

        Ok(SampleResult {
            query,
            series: sampled,
        })
    }
}

fn numeric(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
