// Sensor reading domain model
use chrono::{DateTime, Utc};

/// One stored row of a series: identifier, instant and the ordered sensor vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub values: Vec<f64>,
}

impl RawReading {
    pub fn new(id: i64, timestamp: DateTime<Utc>, values: Vec<f64>) -> Self {
        Self {
            id,
            timestamp,
            values,
        }
    }

    /// A reading whose whole sensor vector is exactly zero is a dropout
    /// artifact, not an observation.
    pub fn is_degenerate(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Accepted band for ingested sensor values, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestBand {
    pub min: f64,
    pub max: f64,
}

impl Default for IngestBand {
    fn default() -> Self {
        Self {
            min: 5.0,
            max: 700.0,
        }
    }
}

impl IngestBand {
    /// Accept the row only if every sensor is present and inside the band.
    /// A single bad value drops the whole row.
    pub fn accept(&self, values: &[Option<f64>]) -> Option<Vec<f64>> {
        values
            .iter()
            .map(|v| v.filter(|x| x.is_finite() && *x >= self.min && *x <= self.max))
            .collect()
    }
}
