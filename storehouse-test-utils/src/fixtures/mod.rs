//! Test fixture modules for database record creation.
//!
//! Fixtures insert warehouse rows into the test database after the tables exist
//! (the second phase of `TestBuilder::build`). Submodules:
//!
//! - `warehouse` - dimension, calendar and fact rows inserted into the database
//! - `factory` - in-memory entity models with standard test values

pub mod factory;
pub mod warehouse;

pub use warehouse::WarehouseFixtures;
