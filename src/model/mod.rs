//! Domain models shared between the ETL stages.
//!
//! - `raw` - source records as extracted from CSV
//! - `dimension` - dimension attribute sets and their natural keys
//! - `calendar` - date dimension rows
//! - `fact` - sales fact candidates and derived metrics
//! - `quarantine` - tagged row-level rejection reasons
//! - `ml` - prediction payloads consumed from model artifacts
//! - `report` - run, load and ingestion reports

pub mod calendar;
pub mod dimension;
pub mod fact;
pub mod ml;
pub mod quarantine;
pub mod raw;
pub mod report;
