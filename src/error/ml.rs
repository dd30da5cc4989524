use thiserror::Error;

/// Errors raised while ingesting externally produced predictions.
///
/// Predictions never create dimension rows, so a reference to an unknown or
/// inactive natural key rejects that single prediction.
#[derive(Error, Debug)]
pub enum MlError {
    #[error("No active customer with natural key {0:?}")]
    UnknownCustomerReference(String),
    #[error("No active product with natural key {0:?}")]
    UnknownProductReference(String),
    #[error("Market basket rule has an empty {0} set")]
    EmptyRuleSide(&'static str),
}
