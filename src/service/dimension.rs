//! Dimension resolution and type-1 upsert.
//!
//! `DimensionBuilder` is the only component that creates dimension rows. Known
//! natural keys are updated in place (attributes overwritten, surrogate key
//! untouched); unknown keys are inserted through the natural-key unique
//! constraint and re-read, so concurrent resolutions of the same new key agree
//! on a single surrogate key.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDateTime, Utc};
use sea_orm::ConnectionTrait;

use crate::{
    data::dimension::{
        CustomerRepository, DimensionStore, LocationRepository, ProductRepository,
        SellerRepository,
    },
    error::{warehouse::WarehouseError, Error},
    model::{
        dimension::{
            CustomerAttributes, DimensionAttributes, DimensionKind, DimensionRow,
            StoredDimension,
        },
        report::LoadSummary,
    },
};

/// Surrogate keys resolved by an upsert, with the load counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionUpsert {
    pub keys: HashMap<(DimensionKind, String), i32>,
    pub summary: LoadSummary,
}

impl DimensionUpsert {
    pub fn key(&self, kind: DimensionKind, natural_key: &str) -> Option<i32> {
        self.keys.get(&(kind, natural_key.to_string())).copied()
    }

    fn absorb(&mut self, kind: DimensionKind, keys: HashMap<String, i32>, summary: LoadSummary) {
        self.keys
            .extend(keys.into_iter().map(|(natural_key, key)| ((kind, natural_key), key)));
        self.summary += summary;
    }
}

pub struct DimensionBuilder<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> DimensionBuilder<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Resolves a dimension row to its surrogate key, creating it when unknown.
    ///
    /// # Returns
    /// - `Ok(i32)` - Surrogate key of the (possibly new) row
    /// - `Err(Error::WarehouseError(DuplicateNaturalKeyConflict))` - The natural key is bound
    ///   to a different identity, or could not be re-read after the gated insert
    /// - `Err(Error::DbErr)` - Storage failure
    pub async fn resolve_or_create(&self, attributes: DimensionAttributes) -> Result<i32, Error> {
        let kind = attributes.kind();
        let natural_key = attributes.natural_key().to_string();

        let upsert = self.upsert_many(vec![attributes]).await?;

        upsert.key(kind, &natural_key).ok_or_else(|| {
            Error::InternalError(format!(
                "{kind} {natural_key:?} missing from its own upsert result"
            ))
        })
    }

    /// Applies the type-1 upsert to many rows of any dimension.
    ///
    /// Rows sharing a natural key within the batch collapse to the last one; if
    /// they disagree on identity the whole call fails with
    /// `DuplicateNaturalKeyConflict`.
    pub async fn upsert_many(
        &self,
        rows: Vec<DimensionAttributes>,
    ) -> Result<DimensionUpsert, Error> {
        let now = Utc::now().naive_utc();

        let mut customers = Vec::new();
        let mut products = Vec::new();
        let mut sellers = Vec::new();
        let mut locations = Vec::new();
        for row in rows {
            match row {
                DimensionAttributes::Customer(attrs) => customers.push(attrs),
                DimensionAttributes::Product(attrs) => products.push(attrs),
                DimensionAttributes::Seller(attrs) => sellers.push(attrs),
                DimensionAttributes::Location(attrs) => locations.push(attrs),
            }
        }

        let mut result = DimensionUpsert::default();

        if !customers.is_empty() {
            let (keys, summary) =
                upsert_rows(&CustomerRepository::new(self.db), customers, now).await?;
            result.absorb(DimensionKind::Customer, keys, summary);
        }
        if !products.is_empty() {
            let (keys, summary) =
                upsert_rows(&ProductRepository::new(self.db), products, now).await?;
            result.absorb(DimensionKind::Product, keys, summary);
        }
        if !sellers.is_empty() {
            let (keys, summary) =
                upsert_rows(&SellerRepository::new(self.db), sellers, now).await?;
            result.absorb(DimensionKind::Seller, keys, summary);
        }
        if !locations.is_empty() {
            let (keys, summary) =
                upsert_rows(&LocationRepository::new(self.db), locations, now).await?;
            result.absorb(DimensionKind::Location, keys, summary);
        }

        tracing::debug!(
            "Dimension upsert: {} inserted, {} updated, {} unchanged",
            result.summary.inserted,
            result.summary.updated,
            result.summary.unchanged
        );

        Ok(result)
    }

    /// Surrogate key of the active row with this natural key. Never creates rows.
    pub async fn lookup(
        &self,
        kind: DimensionKind,
        natural_key: &str,
    ) -> Result<Option<i32>, Error> {
        let found = self.lookup_many(kind, &[natural_key.to_string()]).await?;

        Ok(found.get(natural_key).copied())
    }

    /// Surrogate keys of the active rows among `natural_keys`. Never creates rows.
    pub async fn lookup_many(
        &self,
        kind: DimensionKind,
        natural_keys: &[String],
    ) -> Result<HashMap<String, i32>, Error> {
        let found = match kind {
            DimensionKind::Customer => {
                active_keys(&CustomerRepository::new(self.db), natural_keys).await?
            }
            DimensionKind::Product => {
                active_keys(&ProductRepository::new(self.db), natural_keys).await?
            }
            DimensionKind::Seller => {
                active_keys(&SellerRepository::new(self.db), natural_keys).await?
            }
            DimensionKind::Location => {
                active_keys(&LocationRepository::new(self.db), natural_keys).await?
            }
        };

        Ok(found)
    }

    /// Surrogate key and active flag of the stored row with this natural key.
    pub async fn find_key(
        &self,
        kind: DimensionKind,
        natural_key: &str,
    ) -> Result<Option<(i32, bool)>, Error> {
        match kind {
            DimensionKind::Customer => {
                stored_key(&CustomerRepository::new(self.db), natural_key).await
            }
            DimensionKind::Product => {
                stored_key(&ProductRepository::new(self.db), natural_key).await
            }
            DimensionKind::Seller => stored_key(&SellerRepository::new(self.db), natural_key).await,
            DimensionKind::Location => {
                stored_key(&LocationRepository::new(self.db), natural_key).await
            }
        }
    }

    /// The subset of `surrogate_keys` that exist in the dimension.
    pub async fn existing_keys(
        &self,
        kind: DimensionKind,
        surrogate_keys: &[i32],
    ) -> Result<HashSet<i32>, Error> {
        let keys = match kind {
            DimensionKind::Customer => {
                CustomerRepository::new(self.db)
                    .existing_keys(surrogate_keys)
                    .await?
            }
            DimensionKind::Product => {
                ProductRepository::new(self.db)
                    .existing_keys(surrogate_keys)
                    .await?
            }
            DimensionKind::Seller => {
                SellerRepository::new(self.db)
                    .existing_keys(surrogate_keys)
                    .await?
            }
            DimensionKind::Location => {
                LocationRepository::new(self.db)
                    .existing_keys(surrogate_keys)
                    .await?
            }
        };

        Ok(keys)
    }

    /// Natural key of every row of a dimension, by surrogate key.
    pub async fn natural_keys(&self, kind: DimensionKind) -> Result<HashMap<i32, String>, Error> {
        let keys = match kind {
            DimensionKind::Customer => CustomerRepository::new(self.db).natural_keys().await?,
            DimensionKind::Product => ProductRepository::new(self.db).natural_keys().await?,
            DimensionKind::Seller => SellerRepository::new(self.db).natural_keys().await?,
            DimensionKind::Location => LocationRepository::new(self.db).natural_keys().await?,
        };

        Ok(keys)
    }

    pub async fn count(&self, kind: DimensionKind) -> Result<u64, Error> {
        let count = match kind {
            DimensionKind::Customer => CustomerRepository::new(self.db).count().await?,
            DimensionKind::Product => ProductRepository::new(self.db).count().await?,
            DimensionKind::Seller => SellerRepository::new(self.db).count().await?,
            DimensionKind::Location => LocationRepository::new(self.db).count().await?,
        };

        Ok(count)
    }

    /// The stored customer row, active or not.
    pub async fn find_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<StoredDimension<CustomerAttributes>>, Error> {
        let mut rows = CustomerRepository::new(self.db)
            .find_by_natural_keys(&[customer_id.to_string()])
            .await?;

        Ok(rows.pop())
    }

    /// Soft-deletes a dimension row; returns `false` when no active row matched.
    pub async fn deactivate(&self, kind: DimensionKind, natural_key: &str) -> Result<bool, Error> {
        let now = Utc::now().naive_utc();
        let deactivated = match kind {
            DimensionKind::Customer => {
                CustomerRepository::new(self.db)
                    .deactivate(natural_key, now)
                    .await?
            }
            DimensionKind::Product => {
                ProductRepository::new(self.db)
                    .deactivate(natural_key, now)
                    .await?
            }
            DimensionKind::Seller => {
                SellerRepository::new(self.db)
                    .deactivate(natural_key, now)
                    .await?
            }
            DimensionKind::Location => {
                LocationRepository::new(self.db)
                    .deactivate(natural_key, now)
                    .await?
            }
        };

        if deactivated {
            tracing::info!("Deactivated {} {:?}", kind, natural_key);
        }

        Ok(deactivated)
    }
}

async fn active_keys<S: DimensionStore>(
    store: &S,
    natural_keys: &[String],
) -> Result<HashMap<String, i32>, Error> {
    Ok(store
        .find_by_natural_keys(natural_keys)
        .await?
        .into_iter()
        .filter(|row| row.is_active)
        .map(|row| (row.attributes.natural_key().to_string(), row.surrogate_key))
        .collect())
}

async fn stored_key<S: DimensionStore>(
    store: &S,
    natural_key: &str,
) -> Result<Option<(i32, bool)>, Error> {
    Ok(store
        .find_by_natural_keys(&[natural_key.to_string()])
        .await?
        .into_iter()
        .next()
        .map(|row| (row.surrogate_key, row.is_active)))
}

async fn upsert_rows<S: DimensionStore>(
    store: &S,
    rows: Vec<S::Attributes>,
    now: NaiveDateTime,
) -> Result<(HashMap<String, i32>, LoadSummary), Error> {
    let batch = collapse_batch(rows)?;
    let natural_keys: Vec<String> = batch
        .iter()
        .map(|row| row.natural_key().to_string())
        .collect();

    let stored = by_natural_key(store.find_by_natural_keys(&natural_keys).await?);

    let mut summary = LoadSummary::default();
    let mut resolved = HashMap::with_capacity(batch.len());
    let mut missing = Vec::new();

    for row in batch {
        match stored.get(row.natural_key()) {
            Some(existing) => {
                let key = apply(store, existing, &row, now, &mut summary).await?;
                resolved.insert(row.natural_key().to_string(), key);
            }
            None => missing.push(row),
        }
    }

    if missing.is_empty() {
        return Ok((resolved, summary));
    }

    store.insert_missing(&missing, now).await?;

    let missing_keys: Vec<String> = missing
        .iter()
        .map(|row| row.natural_key().to_string())
        .collect();
    let reread = by_natural_key(store.find_by_natural_keys(&missing_keys).await?);

    for row in missing {
        let Some(existing) = reread.get(row.natural_key()) else {
            return Err(conflict(
                S::Attributes::KIND,
                row.natural_key(),
                "row not readable after gated insert",
            ));
        };

        // Another writer may have won the insert with different attributes
        let key = if existing.attributes == row {
            summary.inserted += 1;
            existing.surrogate_key
        } else {
            apply(store, existing, &row, now, &mut summary).await?
        };
        resolved.insert(row.natural_key().to_string(), key);
    }

    Ok((resolved, summary))
}

/// Overwrites a stored row's mutable attributes when they differ.
async fn apply<S: DimensionStore>(
    store: &S,
    existing: &StoredDimension<S::Attributes>,
    row: &S::Attributes,
    now: NaiveDateTime,
    summary: &mut LoadSummary,
) -> Result<i32, Error> {
    check_identity(&existing.attributes, row)?;

    if row.is_placeholder() {
        summary.unchanged += 1;
        return Ok(existing.surrogate_key);
    }

    let mut row = row.clone();
    row.inherit_identity(&existing.attributes);

    if existing.attributes == row {
        summary.unchanged += 1;
    } else {
        store
            .update_attributes(existing.surrogate_key, &row, now)
            .await?;
        summary.updated += 1;
    }

    Ok(existing.surrogate_key)
}

/// Collapses rows sharing a natural key to the last one, keeping first-seen order.
fn collapse_batch<A: DimensionRow>(rows: Vec<A>) -> Result<Vec<A>, Error> {
    let mut batch: Vec<A> = Vec::with_capacity(rows.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(rows.len());

    for row in rows {
        match index.get(row.natural_key()) {
            Some(&i) => {
                check_identity(&batch[i], &row)?;
                if !row.is_placeholder() {
                    let mut row = row;
                    row.inherit_identity(&batch[i]);
                    batch[i] = row;
                }
            }
            None => {
                index.insert(row.natural_key().to_string(), batch.len());
                batch.push(row);
            }
        }
    }

    Ok(batch)
}

fn check_identity<A: DimensionRow>(existing: &A, incoming: &A) -> Result<(), Error> {
    match (existing.identity(), incoming.identity()) {
        (Some(known), Some(new)) if known != new => Err(conflict(
            A::KIND,
            incoming.natural_key(),
            &format!("identity {known:?} cannot become {new:?}"),
        )),
        _ => Ok(()),
    }
}

fn by_natural_key<A: DimensionRow>(
    rows: Vec<StoredDimension<A>>,
) -> HashMap<String, StoredDimension<A>> {
    rows.into_iter()
        .map(|row| (row.attributes.natural_key().to_string(), row))
        .collect()
}

fn conflict(kind: DimensionKind, natural_key: &str, detail: &str) -> Error {
    WarehouseError::DuplicateNaturalKeyConflict {
        kind,
        natural_key: natural_key.to_string(),
        detail: detail.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests;
