//! Error types for the storehouse ETL engine.
//!
//! Errors are split into domain-specific enums (configuration, warehouse
//! consistency, ML ingestion) aggregated by the top-level [`Error`]. Row-level
//! failures never abort a batch: they are converted into tagged
//! [`QuarantineReason`](crate::model::quarantine::QuarantineReason)s through
//! [`Error::quarantine_reason`]. Everything else propagates and is classified by
//! [`Error::to_retry_strategy`].

pub mod config;
pub mod ml;
pub mod retry;
pub mod warehouse;

use thiserror::Error;

use crate::{
    error::{config::ConfigError, ml::MlError, warehouse::WarehouseError},
    model::quarantine::QuarantineReason,
};

/// Main error type for the storehouse engine.
///
/// Uses `thiserror`'s `#[from]` attribute so underlying errors convert through `?`.
///
/// # Error Categories
/// - Configuration errors (missing/invalid environment variables)
/// - Warehouse consistency errors (identity conflicts, missing calendar rows, load failures)
/// - ML ingestion errors (predictions referencing unknown dimension rows)
/// - External library errors (database, CSV, IO, JSON)
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Warehouse consistency error raised by dimension, transform or load stages.
    #[error(transparent)]
    WarehouseError(#[from] WarehouseError),
    /// ML result ingestion error.
    #[error(transparent)]
    MlError(#[from] MlError),
    /// Parse error (failed to parse a value from string or other format).
    #[error("Failed to parse value: {0:?}")]
    ParseError(String),
    /// Internal error indicating a bug in storehouse's code.
    #[error("Internal error in storehouse, this indicates a bug: {0:?}")]
    InternalError(String),
    /// Database error (query failures, connection issues, constraint violations).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// CSV reader error while extracting source records.
    #[error(transparent)]
    CsvError(#[from] csv::Error),
    /// Filesystem error while reading source files.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// JSON (de)serialization error for ML artifacts and quarantine payloads.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Map a row-level failure onto the quarantine reason recorded for that row.
    ///
    /// Returns `None` for errors that must abort the batch instead.
    pub fn quarantine_reason(&self) -> Option<QuarantineReason> {
        match self {
            Self::WarehouseError(WarehouseError::UnresolvedDimensionReference {
                kind,
                natural_key,
            }) => Some(QuarantineReason::UnresolvedDimensionReference {
                kind: *kind,
                natural_key: natural_key.clone(),
            }),
            Self::WarehouseError(WarehouseError::MissingDateDimensionRow { role, date }) => {
                Some(QuarantineReason::MissingDateDimensionRow {
                    role: *role,
                    date: *date,
                })
            }
            _ => None,
        }
    }
}
