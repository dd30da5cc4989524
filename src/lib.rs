//! Star-schema ETL and warehouse consistency engine.
//!
//! Raw e-commerce extracts are turned into a dimensional warehouse: a calendar
//! table, type-1 customer/product/seller/location dimensions and an
//! append-mostly sales fact table. Order lines that cannot be loaded are
//! quarantined with tagged reasons instead of aborting the batch. ML results
//! are stored as versioned rows keyed by dimension surrogate keys, and
//! analytics projections are served from a cache invalidated by every load.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod service;
pub mod source;
pub mod startup;
pub mod util;
