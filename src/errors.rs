use thiserror::Error;

/// Error type shared by the billing, installment and forecast engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BillingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid card configuration: {0}")]
    InvalidConfig(String),
    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, BillingError>;

impl From<std::io::Error> for BillingError {
    fn from(err: std::io::Error) -> Self {
        BillingError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BillingError {
    fn from(err: serde_json::Error) -> Self {
        BillingError::Storage(err.to_string())
    }
}
