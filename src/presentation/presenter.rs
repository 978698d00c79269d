// Presenter - civil-time rendering and JSON envelopes
use crate::application::sensor_service::SampleResult;
use crate::domain::reading::RawReading;
use crate::domain::series::SeriesSpec;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{Map, Value, json};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct Presenter {
    offset: FixedOffset,
    timezone_label: String,
}

impl Presenter {
    pub fn new(offset: FixedOffset, timezone_label: impl Into<String>) -> Self {
        Self {
            offset,
            timezone_label: timezone_label.into(),
        }
    }

    pub fn format_instant(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    /// `{ id, timestamp, <sensor columns> }`
    pub fn row(&self, reading: &RawReading, series: &SeriesSpec) -> Value {
        let mut row = Map::new();
        row.insert("id".to_string(), json!(reading.id));
        row.insert(
            "timestamp".to_string(),
            json!(self.format_instant(reading.timestamp)),
        );
        for (column, value) in series.columns().iter().zip(&reading.values) {
            row.insert(column.clone(), json!(value));
        }
        Value::Object(row)
    }

    pub fn rows(&self, readings: &[RawReading], series: &SeriesSpec) -> Vec<Value> {
        readings.iter().map(|r| self.row(r, series)).collect()
    }

    pub fn sample_envelope(&self, result: &SampleResult, series: &SeriesSpec) -> Value {
        let mut rows: Vec<(String, Value)> = result
            .series
            .points
            .iter()
            .map(|r| (self.format_instant(r.timestamp), self.row(r, series)))
            .collect();
        // Endpoint substitution can pull a reading out of order.
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        let data: Vec<Value> = rows.into_iter().map(|(_, row)| row).collect();

        json!({
            "data": data,
            "meta": {
                "start_time": self.format_instant(result.query.start),
                "end_time": self.format_instant(result.query.end),
                "interval_minutes": result.query.interval_minutes,
                "sample_count": result.series.points.len(),
                "original_count": result.series.original_count,
                "timezone": self.timezone_label,
            }
        })
    }
}
