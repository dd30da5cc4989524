use sea_orm::{sqlx::sqlite::SqliteError, DbErr, RuntimeErr};

use super::{warehouse::WarehouseError, Error};

/// Strategy for handling errors in a retry context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRetryStrategy {
    /// Retry with exponential backoff (transient storage failures)
    Retry,
    /// Failed permanently (structural or data errors)
    Fail,
}

impl Error {
    /// Determine error retry strategy based upon application Error type
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Self::DbErr(db_err) => match db_err {
                // Connection acquisition errors - transient, should retry
                DbErr::ConnectionAcquire(_) => ErrorRetryStrategy::Retry,
                // Connection errors - transient, should retry
                DbErr::Conn(_) => ErrorRetryStrategy::Retry,
                // Lock contention - the transaction was rolled back and can be replayed
                err if is_contention(err) => ErrorRetryStrategy::Retry,

                // Query errors, constraint violations, type conversion and schema
                // errors won't resolve with retry
                _ => ErrorRetryStrategy::Fail,
            },

            // Already retried to exhaustion
            Self::WarehouseError(WarehouseError::LoadIoFailure { .. }) => ErrorRetryStrategy::Fail,
            Self::WarehouseError(_) => ErrorRetryStrategy::Fail,

            Self::MlError(_) => ErrorRetryStrategy::Fail,
            Self::ConfigError(_) => ErrorRetryStrategy::Fail,
            Self::ParseError(_) => ErrorRetryStrategy::Fail,
            Self::InternalError(_) => ErrorRetryStrategy::Fail,

            // Source files are read before any load starts
            Self::CsvError(_) => ErrorRetryStrategy::Fail,
            Self::IoError(_) => ErrorRetryStrategy::Fail,
            Self::JsonError(_) => ErrorRetryStrategy::Fail,
        }
    }
}

/// SQLite busy/locked results, Postgres serialization failures and deadlocks.
fn is_contention(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };
    let Some(db) = e.as_database_error() else {
        return false;
    };
    let code = db.code().unwrap_or_default();

    if db.try_downcast_ref::<SqliteError>().is_some() {
        // extended result codes keep the primary code in the low byte
        code.parse::<i32>()
            .is_ok_and(|code| matches!(code & 0xff, 5 | 6))
    } else {
        code == "40001" || code == "40P01"
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbErr, RuntimeErr};

    use super::*;

    #[test]
    fn connection_errors_are_retried() {
        let err = Error::DbErr(DbErr::Conn(RuntimeErr::Internal("reset".to_string())));
        assert_eq!(err.to_retry_strategy(), ErrorRetryStrategy::Retry);
    }

    #[test]
    fn query_errors_fail() {
        let err = Error::DbErr(DbErr::Custom("constraint".to_string()));
        assert_eq!(err.to_retry_strategy(), ErrorRetryStrategy::Fail);

        let err = Error::WarehouseError(WarehouseError::SchemaMismatch("dim_date".to_string()));
        assert_eq!(err.to_retry_strategy(), ErrorRetryStrategy::Fail);
    }
}
