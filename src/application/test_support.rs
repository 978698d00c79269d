// In-memory repository and service fixtures for tests
use crate::application::reading_repository::ReadingRepository;
use crate::application::sensor_service::SensorService;
use crate::domain::reading::{IngestBand, RawReading};
use crate::domain::sampling::SamplingOptions;
use crate::domain::series::{SeriesCatalog, SeriesSpec};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct InMemoryRepository {
    tables: Mutex<HashMap<String, Vec<RawReading>>>,
    pub available: AtomicBool,
    pub fail: AtomicBool,
    pub fetches: AtomicUsize,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }
}

impl InMemoryRepository {
    pub fn push(&self, table: &str, id: i64, timestamp: DateTime<Utc>, values: Vec<f64>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(RawReading::new(id, timestamp, values));
    }

    pub fn rows(&self, table: &str) -> Vec<RawReading> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("connection reset by peer");
        }
        Ok(())
    }
}

#[async_trait]
impl ReadingRepository for InMemoryRepository {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn fetch_range(
        &self,
        series: &SeriesSpec,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RawReading>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows: Vec<RawReading> = self
            .rows(&series.table)
            .into_iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .collect();
        rows.sort_by_key(|r| (r.timestamp, r.id));
        Ok(rows)
    }

    async fn fetch_latest(&self, series: &SeriesSpec) -> anyhow::Result<Option<RawReading>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .rows(&series.table)
            .into_iter()
            .max_by_key(|r| r.timestamp))
    }

    async fn insert(&self, series: &SeriesSpec, values: &[f64]) -> anyhow::Result<i64> {
        self.check()?;
        let id = self.rows(&series.table).len() as i64 + 1;
        self.push(&series.table, id, Utc::now(), values.to_vec());
        Ok(id)
    }
}

pub fn test_catalog() -> SeriesCatalog {
    let specs = ["t4", "t5", "g1", "g2", "g3"]
        .into_iter()
        .map(|name| SeriesSpec::new(name, name, 8, "sensor").unwrap())
        .collect();
    SeriesCatalog::new(specs).unwrap()
}

pub fn service_with(repository: Arc<InMemoryRepository>) -> SensorService {
    SensorService::new(
        repository,
        test_catalog(),
        SamplingOptions::default(),
        IngestBand::default(),
        60,
        FixedOffset::east_opt(7 * 3600).unwrap(),
    )
}
