//! Idempotent batch loads.
//!
//! Each load opens one transaction per batch and runs under the retry context,
//! so a transient connection failure replays the whole batch from scratch.
//! Dimensions and calendar rows are upserted; facts are append-only and may
//! only backfill fields that were unknown when they were first loaded.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::{NaiveDateTime, Utc};
use sea_orm::{ActiveValue, DatabaseConnection, TransactionTrait};

use crate::{
    data::{calendar::CalendarRepository, fact::FactRepository},
    error::Error,
    model::{
        calendar::CalendarRow,
        dimension::DimensionAttributes,
        fact::ValidatedFact,
        quarantine::QuarantineReason,
        report::{FactLoadReport, LoadSummary},
    },
    service::{
        dimension::{DimensionBuilder, DimensionUpsert},
        retry::RetryContext,
        validate::quarantine_entry,
    },
};

/// Monotonic counter bumped by every load that writes to the warehouse.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct WarehouseEpoch(Arc<AtomicU64>);

impl WarehouseEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Advances the epoch, returning the new value.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

pub struct LoadCoordinator<'a> {
    db: &'a DatabaseConnection,
    retry: RetryContext,
    epoch: WarehouseEpoch,
}

impl<'a> LoadCoordinator<'a> {
    pub fn new(db: &'a DatabaseConnection, retry: RetryContext, epoch: WarehouseEpoch) -> Self {
        Self { db, retry, epoch }
    }

    pub fn epoch(&self) -> &WarehouseEpoch {
        &self.epoch
    }

    /// Upserts dimension rows of any kind in one transaction.
    ///
    /// # Returns
    /// - `Ok(DimensionUpsert)` - Resolved surrogate keys and inserted/updated/unchanged counts
    /// - `Err(Error::WarehouseError(DuplicateNaturalKeyConflict))` - Identity conflict, nothing committed
    /// - `Err(Error::WarehouseError(LoadIoFailure))` - Transient failures exhausted the retries
    pub async fn load_dimensions(
        &self,
        rows: Vec<DimensionAttributes>,
    ) -> Result<DimensionUpsert, Error> {
        if rows.is_empty() {
            return Ok(DimensionUpsert::default());
        }

        let description = format!("load of {} dimension rows", rows.len());
        let db = self.db;
        let rows = &rows;

        let upsert = self
            .retry
            .execute_with_retry(&description, move || async move {
                let txn = db.begin().await?;
                let upsert = DimensionBuilder::new(&txn).upsert_many(rows.clone()).await?;
                txn.commit().await?;

                Ok::<_, Error>(upsert)
            })
            .await?;

        self.record_write(&upsert.summary);
        tracing::info!(
            "Loaded dimensions: {} inserted, {} updated, {} unchanged",
            upsert.summary.inserted,
            upsert.summary.updated,
            upsert.summary.unchanged
        );

        Ok(upsert)
    }

    /// Upserts calendar rows keyed by date key.
    pub async fn load_calendar(&self, rows: Vec<CalendarRow>) -> Result<LoadSummary, Error> {
        if rows.is_empty() {
            return Ok(LoadSummary::default());
        }

        let description = format!("load of {} calendar days", rows.len());
        let db = self.db;
        let rows = &rows;

        let summary = self
            .retry
            .execute_with_retry(&description, move || async move {
                let txn = db.begin().await?;
                let summary = upsert_calendar(&CalendarRepository::new(&txn), rows).await?;
                txn.commit().await?;

                Ok::<_, Error>(summary)
            })
            .await?;

        self.record_write(&summary);
        tracing::info!(
            "Loaded calendar: {} inserted, {} updated, {} unchanged",
            summary.inserted,
            summary.updated,
            summary.unchanged
        );

        Ok(summary)
    }

    /// Appends validated facts keyed by `(order_id, order_item_id)`.
    ///
    /// Facts already loaded are compared field by field: fields that were null
    /// are backfilled (with the accompanying order status), identical facts are
    /// left untouched, and facts that would change any other field are not
    /// applied and come back in `FactLoadReport::rejected`.
    pub async fn load_facts(&self, facts: Vec<ValidatedFact>) -> Result<FactLoadReport, Error> {
        if facts.is_empty() {
            return Ok(FactLoadReport::default());
        }

        let description = format!("load of {} facts", facts.len());
        let db = self.db;
        let facts = &facts;

        let report = self
            .retry
            .execute_with_retry(&description, move || async move {
                let txn = db.begin().await?;
                let report =
                    append_facts(&FactRepository::new(&txn), facts, Utc::now().naive_utc())
                        .await?;
                txn.commit().await?;

                Ok::<_, Error>(report)
            })
            .await?;

        self.record_write(&report.summary);
        tracing::info!(
            "Loaded facts: {} inserted, {} backfilled, {} unchanged, {} rejected",
            report.summary.inserted,
            report.summary.updated,
            report.summary.unchanged,
            report.rejected.len()
        );

        Ok(report)
    }

    fn record_write(&self, summary: &LoadSummary) {
        if summary.wrote() {
            let epoch = self.epoch.bump();
            tracing::debug!("Warehouse epoch advanced to {}", epoch);
        }
    }
}

async fn upsert_calendar<C: sea_orm::ConnectionTrait>(
    repo: &CalendarRepository<'_, C>,
    rows: &[CalendarRow],
) -> Result<LoadSummary, Error> {
    let date_keys: Vec<i32> = rows.iter().map(|row| row.date_key).collect();
    let stored: HashMap<i32, CalendarRow> = repo
        .find_by_date_keys(&date_keys)
        .await?
        .into_iter()
        .map(|model| (model.date_key, CalendarRow::from(model)))
        .collect();

    let mut summary = LoadSummary::default();
    let mut missing = Vec::new();

    for row in rows {
        match stored.get(&row.date_key) {
            None => missing.push(row.clone()),
            Some(existing) if existing == row => summary.unchanged += 1,
            Some(_) => {
                repo.update(row).await?;
                summary.updated += 1;
            }
        }
    }

    repo.insert_missing(&missing).await?;
    summary.inserted += missing.len();

    Ok(summary)
}

async fn append_facts<C: sea_orm::ConnectionTrait>(
    repo: &FactRepository<'_, C>,
    facts: &[ValidatedFact],
    now: NaiveDateTime,
) -> Result<FactLoadReport, Error> {
    let facts = collapse_facts(facts);
    let keys: Vec<(String, i32)> = facts
        .iter()
        .map(|fact| (fact.candidate.order_id.clone(), fact.candidate.order_item_id))
        .collect();
    let stored = repo.find_by_keys(&keys).await?;

    let mut report = FactLoadReport::default();
    let mut inserts = Vec::new();

    for (fact, key) in facts.into_iter().zip(keys) {
        let Some(existing) = stored.get(&key) else {
            inserts.push(fact.to_active_model(now));
            continue;
        };

        match diff_fact(existing, fact, now) {
            FactChange::Unchanged => report.summary.unchanged += 1,
            FactChange::Backfill(update) => {
                repo.update(*update).await?;
                report.summary.updated += 1;
            }
            FactChange::Rewrite(fields) => {
                tracing::warn!(
                    "Fact {}/{} would rewrite immutable fields {:?}",
                    key.0,
                    key.1,
                    fields
                );
                report.rejected.push(quarantine_entry(
                    &fact.candidate,
                    vec![QuarantineReason::ImmutableFactRewrite { fields }],
                ));
            }
        }
    }

    report.summary.inserted = inserts.len();
    repo.insert_many(inserts).await?;

    Ok(report)
}

/// Keeps the last fact per `(order_id, order_item_id)`, in first-seen order.
fn collapse_facts(facts: &[ValidatedFact]) -> Vec<&ValidatedFact> {
    let mut collapsed: Vec<&ValidatedFact> = Vec::with_capacity(facts.len());
    let mut index: HashMap<(&str, i32), usize> = HashMap::with_capacity(facts.len());

    for fact in facts {
        match index.get(&fact.key()) {
            Some(&i) => collapsed[i] = fact,
            None => {
                index.insert(fact.key(), collapsed.len());
                collapsed.push(fact);
            }
        }
    }

    collapsed
}

#[derive(Debug)]
enum FactChange {
    Unchanged,
    Backfill(Box<entity::fact_sales::ActiveModel>),
    Rewrite(Vec<String>),
}

fn diff_fact(
    stored: &entity::fact_sales::Model,
    fact: &ValidatedFact,
    now: NaiveDateTime,
) -> FactChange {
    let incoming = fact.to_model(now);
    let mut rewrites: Vec<String> = Vec::new();
    let mut update = entity::fact_sales::ActiveModel {
        order_id: ActiveValue::Unchanged(stored.order_id.clone()),
        order_item_id: ActiveValue::Unchanged(stored.order_item_id),
        ..Default::default()
    };
    let mut backfilled = false;

    macro_rules! fixed {
        ($($field:ident),+ $(,)?) => {$(
            if stored.$field != incoming.$field {
                rewrites.push(stringify!($field).to_string());
            }
        )+};
    }

    macro_rules! backfill {
        ($($field:ident),+ $(,)?) => {$(
            match (&stored.$field, &incoming.$field) {
                (None, Some(value)) => {
                    update.$field = ActiveValue::Set(Some(value.clone()));
                    backfilled = true;
                }
                (Some(old), Some(new)) if old != new => {
                    rewrites.push(stringify!($field).to_string());
                }
                _ => {}
            }
        )+};
    }

    fixed!(
        customer_key,
        product_key,
        seller_key,
        location_key,
        order_date_key,
        price,
        freight_value,
        total_value,
        payment_installments,
        order_purchase_timestamp,
    );
    backfill!(
        delivery_date_key,
        order_approved_at,
        order_delivered_carrier_date,
        order_delivered_customer_date,
        order_estimated_delivery_date,
        delivery_delay_days,
        processing_time_hours,
        is_delivered_ontime,
        is_fast_delivery,
    );

    if stored.order_status != incoming.order_status {
        if backfilled {
            update.order_status = ActiveValue::Set(incoming.order_status.clone());
        } else {
            rewrites.push("order_status".to_string());
        }
    }

    if !rewrites.is_empty() {
        FactChange::Rewrite(rewrites)
    } else if backfilled {
        update.updated_date = ActiveValue::Set(now);
        FactChange::Backfill(Box::new(update))
    } else {
        FactChange::Unchanged
    }
}

#[cfg(test)]
mod tests;
