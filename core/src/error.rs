use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Invalid input for customer '{customer_id}': {field} {reason}")]
    InvalidInput {
        customer_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Batch mismatch: {records} records paired with {results} rows")]
    BatchMismatch { records: usize, results: usize },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RiskError {
    pub fn invalid(customer_id: &str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            customer_id: customer_id.to_string(),
            field,
            reason: reason.into(),
        }
    }
}

pub type RiskResult<T> = Result<T, RiskError>;
