//! Retry logic with exponential backoff for batch loads.
//!
//! This module provides the `RetryContext` for executing storage operations with
//! automatic retry and exponential backoff. Only errors classified as
//! `ErrorRetryStrategy::Retry` (transient connection failures) are retried; once
//! the attempts are exhausted the failure escalates to
//! `WarehouseError::LoadIoFailure`.

use std::future::Future;

use crate::{
    config::RetryConfig,
    error::{retry::ErrorRetryStrategy, warehouse::WarehouseError, Error},
};

/// Context for executing operations with automatic retry logic.
///
/// # Retry Behavior
///
/// - **Max attempts**: 3 (default)
/// - **Backoff strategy**: Exponential starting at 1 second (1s, 2s, 4s, ...)
/// - **Retry conditions**: Only errors with `ErrorRetryStrategy::Retry` are retried
/// - **Permanent failures**: Errors with `ErrorRetryStrategy::Fail` return immediately
///
/// # Example
///
/// ```ignore
/// let ctx = RetryContext::new();
///
/// ctx.execute_with_retry("load of 120 customer rows", move || async move {
///     let txn = db.begin().await?;
///     let summary = DimensionBuilder::new(&txn).upsert_many(rows.clone()).await?;
///     txn.commit().await?;
///
///     Ok(summary)
/// })
/// .await?;
/// ```
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Maximum number of attempts before giving up
    max_attempts: u32,
    /// Backoff schedule (doubles with each retry)
    schedule: RetryConfig,
}

impl RetryContext {
    /// Creates a new retry context with 3 max attempts and 1 second initial backoff.
    pub fn new() -> Self {
        Self::from_config(&RetryConfig::default())
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            schedule: config.clone(),
        }
    }

    /// Executes an operation with automatic retry logic and exponential backoff.
    ///
    /// The operation is invoked afresh for every attempt, so it must open its own
    /// transaction each time.
    ///
    /// # Arguments
    /// - `description` - Human-readable description for logging (e.g., "fact load")
    /// - `operation` - Async operation returning `Result<R, Error>`
    ///
    /// # Returns
    /// - `Ok(R)` - Operation succeeded
    /// - `Err(Error::WarehouseError(LoadIoFailure))` - Transient failures exhausted every attempt
    /// - `Err(Error)` - Operation failed permanently
    pub async fn execute_with_retry<R, F, Fut>(
        &self,
        description: &str,
        mut operation: F,
    ) -> Result<R, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, Error>>,
    {
        let mut attempt_count = 0;

        loop {
            tracing::debug!(
                "Processing {} (attempt {}/{})",
                description,
                attempt_count + 1,
                self.max_attempts
            );

            match operation().await {
                Ok(result) => {
                    tracing::debug!("Successfully processed {}", description);
                    return Ok(result);
                }
                Err(e) => match e.to_retry_strategy() {
                    ErrorRetryStrategy::Fail => {
                        tracing::error!("Permanent error for {}: {:?}", description, e);
                        return Err(e);
                    }
                    ErrorRetryStrategy::Retry => {
                        attempt_count += 1;
                        if attempt_count >= self.max_attempts {
                            tracing::error!(
                                "Max attempts ({}) exceeded for {}: {:?}",
                                self.max_attempts,
                                description,
                                e
                            );
                            return Err(escalate(description, attempt_count, e));
                        }

                        let backoff = self.schedule.backoff(attempt_count);

                        tracing::warn!(
                            "Retrying {} (attempt {}/{}) after {:?}: {:?}",
                            description,
                            attempt_count,
                            self.max_attempts,
                            backoff,
                            e
                        );

                        tokio::time::sleep(backoff).await;
                    }
                },
            }
        }
    }
}

impl Default for RetryContext {
    fn default() -> Self {
        Self::new()
    }
}

fn escalate(description: &str, attempts: u32, error: Error) -> Error {
    match error {
        Error::DbErr(source) => WarehouseError::LoadIoFailure {
            operation: description.to_string(),
            attempts,
            source,
        }
        .into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use sea_orm::{DbErr, RuntimeErr};

    use super::*;

    fn fast() -> RetryContext {
        RetryContext::from_config(&RetryConfig {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
        })
    }

    fn transient() -> Error {
        Error::DbErr(DbErr::Conn(RuntimeErr::Internal("connection reset".to_string())))
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = fast()
            .execute_with_retry("flaky load", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_escalates_to_load_io_failure() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), Error> = fast()
            .execute_with_retry("doomed load", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            })
            .await;

        assert!(matches!(
            result,
            Err(Error::WarehouseError(WarehouseError::LoadIoFailure { attempts: 3, .. }))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), Error> = fast()
            .execute_with_retry("broken load", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::DbErr(DbErr::Custom("constraint failed".to_string())))
            })
            .await;

        assert!(matches!(result, Err(Error::DbErr(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
