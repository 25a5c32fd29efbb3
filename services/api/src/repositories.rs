//! Repositories for database operations

use thiserror::Error;

pub mod car;

pub use car::CarRepository;

/// Failures surfaced by the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint (VIN, stock number) rejected the write
    #[error("Unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// Connectivity or driver failure
    #[error("Database error: {0}")]
    Query(#[source] sqlx::Error),
}

impl StoreError {
    /// Stable code exposed to clients
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Conflict { .. } => "CONFLICT",
            StoreError::Query(_) => "STORAGE_ERROR",
        }
    }

    /// Field behind a conflicting constraint, when known
    pub fn conflicting_field(&self) -> Option<&'static str> {
        match self {
            StoreError::Conflict { constraint } => match constraint.as_str() {
                "cars_vin_key" => Some("vin"),
                "cars_stock_number_key" => Some("stock_number"),
                _ => None,
            },
            StoreError::Query(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Query(err)
    }
}

/// Type alias for store results
pub type StoreResult<T> = Result<T, StoreError>;
