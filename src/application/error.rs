// Error taxonomy shared by the use cases
use crate::domain::sampling::SamplingError;
use crate::domain::time::RangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RangeError> for ServiceError {
    fn from(err: RangeError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<SamplingError> for ServiceError {
    fn from(err: SamplingError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
