// Application layer - Use cases over the reading store
pub mod error;
pub mod reading_repository;
pub mod sensor_service;

#[cfg(test)]
pub mod test_support;
