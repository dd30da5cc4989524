//! Utility functions shared across the ETL stages.
//!
//! This module provides timestamp parsing and date-key encoding (`time`) and the
//! fixed reference tables used when deriving descriptive attributes (`region`).

pub mod region;
pub mod time;
