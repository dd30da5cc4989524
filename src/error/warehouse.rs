use chrono::NaiveDate;
use sea_orm::DbErr;
use thiserror::Error;

use crate::model::{dimension::DimensionKind, quarantine::DateRole};

#[derive(Error, Debug)]
pub enum WarehouseError {
    /// A natural key maps to conflicting identities, or could not be re-read
    /// after the gated insert.
    #[error("Conflicting {kind} rows for natural key {natural_key:?}: {detail}")]
    DuplicateNaturalKeyConflict {
        kind: DimensionKind,
        natural_key: String,
        detail: String,
    },
    #[error("No calendar row for {role} date {date}")]
    MissingDateDimensionRow { role: DateRole, date: NaiveDate },
    #[error("Unresolved {kind} reference {natural_key:?}")]
    UnresolvedDimensionReference {
        kind: DimensionKind,
        natural_key: String,
    },
    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    LoadIoFailure {
        operation: String,
        attempts: u32,
        #[source]
        source: DbErr,
    },
    #[error("Warehouse schema mismatch: {0}")]
    SchemaMismatch(String),
}
