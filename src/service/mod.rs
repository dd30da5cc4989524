//! ETL stages and warehouse services.
//!
//! Services own the business rules and return [`crate::error::Error`]; storage
//! access goes through the repositories in [`crate::data`].

pub mod analytics;
pub mod calendar;
pub mod dimension;
pub mod load;
pub mod ml;
pub mod pipeline;
pub mod quality;
pub mod retry;
pub mod transform;
pub mod validate;
