// Domain layer - Readings, series catalog and the resampling engine
pub mod reading;
pub mod sampling;
pub mod series;
pub mod time;
