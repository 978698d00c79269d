use crate::domain::reading::IngestBand;
use crate::domain::sampling::{
    DEFAULT_BOUNDARY_WINDOW_MS, DEFAULT_MAX_GRID_POINTS, DEFAULT_TOLERANCE_MS, SamplingOptions,
};
use crate::domain::series::{CatalogError, SeriesCatalog, SeriesSpec, ensure_identifier};
use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;

pub const DEFAULT_SERIES: [&str; 5] = ["t4", "t5", "g1", "g2", "g3"];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub sampling: SamplingSettings,
    pub presentation: PresentationSettings,
    pub ingest: IngestSettings,
    #[serde(default = "default_series")]
    pub series: Vec<SeriesConfig>,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub retry_delay_secs: u64,
    pub schema: String,
    pub timezone: String,
    /// `disable`, `allow`, `prefer`, `require`, `verify-ca` or `verify-full`;
    /// unset leaves the url's `sslmode` in charge.
    #[serde(default)]
    pub ssl_mode: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SamplingSettings {
    pub tolerance_ms: i64,
    pub boundary_window_ms: i64,
    pub substitute_first_endpoint: bool,
    pub default_interval_minutes: i64,
    pub max_grid_points: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PresentationSettings {
    pub utc_offset_minutes: i32,
    pub timezone_label: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestSettings {
    pub min_value: f64,
    pub max_value: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub name: String,
    pub table: Option<String>,
    #[serde(default = "default_sensor_count")]
    pub sensor_count: usize,
    #[serde(default = "default_column_prefix")]
    pub column_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub filter: String,
}

fn default_series() -> Vec<SeriesConfig> {
    DEFAULT_SERIES
        .iter()
        .map(|name| SeriesConfig {
            name: name.to_string(),
            table: None,
            sensor_count: default_sensor_count(),
            column_prefix: default_column_prefix(),
        })
        .collect()
}

fn default_sensor_count() -> usize {
    8
}

fn default_column_prefix() -> String {
    "sensor".to_string()
}

/// Defaults, then `config/app.*` if present, then `THERMO__SECTION__KEY` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "postgres://postgres@localhost:5432/postgres")?
        .set_default("database.max_connections", 5)?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("database.retry_delay_secs", 5)?
        .set_default("database.schema", "iot")?
        .set_default("database.timezone", "Asia/Ho_Chi_Minh")?
        .set_default("sampling.tolerance_ms", DEFAULT_TOLERANCE_MS)?
        .set_default("sampling.boundary_window_ms", DEFAULT_BOUNDARY_WINDOW_MS)?
        .set_default("sampling.substitute_first_endpoint", true)?
        .set_default("sampling.default_interval_minutes", 60)?
        .set_default("sampling.max_grid_points", DEFAULT_MAX_GRID_POINTS as u64)?
        .set_default("presentation.utc_offset_minutes", 420)?
        .set_default("presentation.timezone_label", "Asia/Ho_Chi_Minh (GMT+7)")?
        .set_default("ingest.min_value", 5.0)?
        .set_default("ingest.max_value", 700.0)?
        .set_default("log.filter", "info")?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("THERMO").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

impl AppConfig {
    pub fn catalog(&self) -> anyhow::Result<SeriesCatalog> {
        ensure_identifier(&self.database.schema).context("invalid database.schema")?;
        let specs = self
            .series
            .iter()
            .map(|s| {
                let table = s.table.as_deref().unwrap_or(&s.name);
                SeriesSpec::new(&s.name, table, s.sensor_count, &s.column_prefix)
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        Ok(SeriesCatalog::new(specs)?)
    }

    pub fn sampling_options(&self) -> anyhow::Result<SamplingOptions> {
        let s = &self.sampling;
        if s.default_interval_minutes <= 0 {
            anyhow::bail!(
                "sampling.default_interval_minutes must be positive, got {}",
                s.default_interval_minutes
            );
        }
        if s.tolerance_ms < 0 || s.boundary_window_ms < 0 {
            anyhow::bail!("sampling windows must not be negative");
        }
        Ok(SamplingOptions {
            tolerance_ms: s.tolerance_ms,
            boundary_window_ms: s.boundary_window_ms,
            substitute_first_endpoint: s.substitute_first_endpoint,
            max_grid_points: s.max_grid_points,
        })
    }

    pub fn ingest_band(&self) -> anyhow::Result<IngestBand> {
        if self.ingest.min_value > self.ingest.max_value {
            anyhow::bail!(
                "ingest.min_value {} exceeds ingest.max_value {}",
                self.ingest.min_value,
                self.ingest.max_value
            );
        }
        Ok(IngestBand {
            min: self.ingest.min_value,
            max: self.ingest.max_value,
        })
    }

    pub fn civil_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.presentation.utc_offset_minutes * 60).with_context(|| {
            format!(
                "presentation.utc_offset_minutes {} is out of range",
                self.presentation.utc_offset_minutes
            )
        })
    }
}
