//! Dimension repositories.
//!
//! Each dimension table implements [`DimensionStore`], the storage half of the
//! type-1 upsert performed by
//! [`DimensionBuilder`](crate::service::dimension::DimensionBuilder). Inserts go
//! through the natural-key unique constraint with `ON CONFLICT DO NOTHING`, so
//! concurrent writers converge on one row per natural key.

pub mod customer;
pub mod location;
pub mod product;
pub mod seller;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use sea_orm::DbErr;

use crate::model::dimension::{DimensionRow, StoredDimension};

pub use customer::CustomerRepository;
pub use location::LocationRepository;
pub use product::ProductRepository;
pub use seller::SellerRepository;

#[allow(async_fn_in_trait)]
pub trait DimensionStore {
    type Attributes: DimensionRow;

    /// Rows whose natural key is in `natural_keys`, active or not.
    async fn find_by_natural_keys(
        &self,
        natural_keys: &[String],
    ) -> Result<Vec<StoredDimension<Self::Attributes>>, DbErr>;

    /// Inserts the rows, silently skipping natural keys that already exist.
    async fn insert_missing(
        &self,
        rows: &[Self::Attributes],
        now: NaiveDateTime,
    ) -> Result<(), DbErr>;

    /// Overwrites the mutable attributes of an existing row.
    async fn update_attributes(
        &self,
        surrogate_key: i32,
        attributes: &Self::Attributes,
        now: NaiveDateTime,
    ) -> Result<(), DbErr>;

    /// The subset of `surrogate_keys` that exist.
    async fn existing_keys(&self, surrogate_keys: &[i32]) -> Result<HashSet<i32>, DbErr>;

    /// Natural key of every row by surrogate key.
    async fn natural_keys(&self) -> Result<HashMap<i32, String>, DbErr>;

    async fn count(&self) -> Result<u64, DbErr>;

    /// Marks the row inactive; returns `false` when no active row matched.
    async fn deactivate(&self, natural_key: &str, now: NaiveDateTime) -> Result<bool, DbErr>;
}

#[cfg(test)]
mod tests;
