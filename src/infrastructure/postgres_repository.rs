// PostgreSQL repository implementation
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::RawReading;
use crate::domain::series::SeriesSpec;
use crate::infrastructure::config::DatabaseSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow, PgSslMode};
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Pool-backed store. Starts unavailable; `spawn_connector` fills the pool
/// once the database answers.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: Arc<RwLock<Option<PgPool>>>,
    options: PgConnectOptions,
    settings: DatabaseSettings,
}

impl PostgresRepository {
    /// Fails on a malformed `database.url` or `database.ssl_mode`; only the
    /// network connect is retried later.
    pub fn new(settings: DatabaseSettings) -> Result<Self> {
        Ok(Self {
            pool: Arc::new(RwLock::new(None)),
            options: connect_options(&settings)?,
            settings,
        })
    }

    /// Keep trying to connect in the background until the pool is up.
    pub fn spawn_connector(&self) {
        let repo = self.clone();
        tokio::spawn(async move {
            let delay = Duration::from_secs(repo.settings.retry_delay_secs);
            loop {
                match repo.connect().await {
                    Ok(pool) => {
                        *repo.pool.write().await = Some(pool);
                        tracing::info!("Connected to PostgreSQL");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(
                            "PostgreSQL connection failed: {:#}; retrying in {}s",
                            e,
                            delay.as_secs()
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        });
    }

    async fn connect(&self) -> Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .acquire_timeout(Duration::from_secs(self.settings.acquire_timeout_secs))
            .connect_with(self.options.clone())
            .await
            .context("Failed to connect to PostgreSQL")
    }

    async fn pool(&self) -> Result<PgPool> {
        self.pool
            .read()
            .await
            .clone()
            .context("PostgreSQL pool is not connected")
    }

    fn select_clause(&self, series: &SeriesSpec) -> String {
        let sensors = series
            .columns()
            .iter()
            .map(|c| format!("{c}::DOUBLE PRECISION AS {c}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "SELECT id::BIGINT AS id, timestamp::TIMESTAMPTZ AS timestamp, {} FROM {}.{}",
            sensors, self.settings.schema, series.table
        )
    }

    fn range_query(&self, series: &SeriesSpec) -> String {
        format!(
            "{} WHERE timestamp BETWEEN $1 AND $2 ORDER BY timestamp ASC, id ASC",
            self.select_clause(series)
        )
    }

    fn latest_query(&self, series: &SeriesSpec) -> String {
        format!(
            "{} ORDER BY timestamp DESC, id DESC LIMIT 1",
            self.select_clause(series)
        )
    }

    fn insert_query(&self, series: &SeriesSpec) -> String {
        let placeholders = (1..=series.sensor_count)
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {}.{} ({}, timestamp) VALUES ({}, CURRENT_TIMESTAMP) RETURNING id::BIGINT AS id",
            self.settings.schema,
            series.table,
            series.columns().join(", "),
            placeholders
        )
    }

    fn map_row(series: &SeriesSpec, row: &PgRow) -> Result<RawReading> {
        let id: i64 = row.try_get("id")?;
        let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
        let values = series
            .columns()
            .iter()
            .map(|c| {
                row.try_get::<f64, _>(c.as_str())
                    .with_context(|| format!("Failed to read {} of row {}", c, id))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RawReading::new(id, timestamp, values))
    }
}

fn connect_options(settings: &DatabaseSettings) -> Result<PgConnectOptions> {
    let mut options = PgConnectOptions::from_str(&settings.url)
        .context("Invalid database.url")?
        .options([("timezone", settings.timezone.as_str())]);

    // Overrides any sslmode carried in the url.
    if let Some(mode) = &settings.ssl_mode {
        let mode = PgSslMode::from_str(mode)
            .with_context(|| format!("Invalid database.ssl_mode {:?}", mode))?;
        options = options.ssl_mode(mode);
    }
    Ok(options)
}

#[async_trait]
impl ReadingRepository for PostgresRepository {
    async fn is_available(&self) -> bool {
        self.pool
            .read()
            .await
            .as_ref()
            .is_some_and(|pool| !pool.is_closed())
    }

    async fn fetch_range(
        &self,
        series: &SeriesSpec,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawReading>> {
        let pool = self.pool().await?;
        let query = self.range_query(series);
        tracing::debug!("Executing range query: {}", query);

        let rows = sqlx::query(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&pool)
            .await
            .with_context(|| format!("Failed to fetch readings from {}", series.table))?;

        rows.iter().map(|row| Self::map_row(series, row)).collect()
    }

    async fn fetch_latest(&self, series: &SeriesSpec) -> Result<Option<RawReading>> {
        let pool = self.pool().await?;
        let query = self.latest_query(series);

        let row = sqlx::query(&query)
            .fetch_optional(&pool)
            .await
            .with_context(|| format!("Failed to fetch latest reading from {}", series.table))?;

        row.as_ref().map(|r| Self::map_row(series, r)).transpose()
    }

    async fn insert(&self, series: &SeriesSpec, values: &[f64]) -> Result<i64> {
        if values.len() != series.sensor_count {
            anyhow::bail!(
                "{} expects {} sensor values, got {}",
                series.name,
                series.sensor_count,
                values.len()
            );
        }

        let pool = self.pool().await?;
        let query = self.insert_query(series);
        let mut statement = sqlx::query(&query);
        for value in values {
            statement = statement.bind(*value);
        }

        let row = statement
            .fetch_one(&pool)
            .await
            .with_context(|| format!("Failed to insert reading into {}", series.table))?;

        Ok(row.try_get("id")?)
    }
}
