//! End-to-end batch pipeline.
//!
//! A run materializes the calendar, loads dimensions, transforms and validates
//! every order line, loads the accepted facts and records the rejected ones.
//! Row-level failures are quarantined and the run continues; any other error
//! aborts it. Either way the run row is closed with the final report.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    config::WarehouseConfig,
    data::{
        calendar::CalendarRepository, quarantine::QuarantineRepository, run::RunRepository,
        verify_schema,
    },
    error::Error,
    model::{
        calendar::CalendarRow,
        dimension::{
            CustomerAttributes, DimensionAttributes, ProductAttributes, SellerAttributes,
        },
        quarantine::{QuarantineEntry, QuarantineReason},
        raw::{RawOrder, RawOrderItem},
        report::{RunReport, RunStatus},
    },
    service::{
        calendar::DateDimensionGenerator,
        load::{LoadCoordinator, WarehouseEpoch},
        retry::RetryContext,
        transform::{FactTransformer, MaterializedCalendar},
        validate::{KeySnapshot, ReferentialValidator},
    },
    source::SourceBatch,
};

pub struct BatchPipeline<'a> {
    db: &'a DatabaseConnection,
    config: &'a WarehouseConfig,
    epoch: WarehouseEpoch,
}

impl<'a> BatchPipeline<'a> {
    pub fn new(db: &'a DatabaseConnection, config: &'a WarehouseConfig, epoch: WarehouseEpoch) -> Self {
        Self { db, config, epoch }
    }

    /// Runs the batch and returns its report; aborted runs carry the abort cause.
    pub async fn run(&self, batch: &SourceBatch) -> RunReport {
        let mut report = RunReport::new(Utc::now().naive_utc());
        report.quarantined.extend(batch.malformed.iter().cloned());

        match self.execute(batch, &mut report).await {
            Ok(()) => report.status = RunStatus::Completed,
            Err(e) => {
                tracing::error!("Batch run aborted: {}", e);
                report.status = RunStatus::Aborted;
                report.abort_cause = Some(e.to_string());
            }
        }
        report.finished_at = Some(Utc::now().naive_utc());

        if let Some(run_id) = report.run_id {
            if let Err(e) = self.close_run(run_id, &report).await {
                tracing::error!("Failed to record outcome of run {}: {}", run_id, e);
            }
        }

        tracing::info!(
            "Run {} {}: {} lines processed, {} loaded, {} quarantined",
            report.run_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            report.status,
            report.rows_processed,
            report.rows_loaded,
            report.quarantined.len()
        );

        report
    }

    async fn execute(&self, batch: &SourceBatch, report: &mut RunReport) -> Result<(), Error> {
        verify_schema(self.db).await?;

        let run = RunRepository::new(self.db).start(report.started_at).await?;
        report.run_id = Some(run.id);
        tracing::info!("Started run {}", run.id);

        let loader = LoadCoordinator::new(
            self.db,
            RetryContext::from_config(&self.config.load_retry),
            self.epoch.clone(),
        );

        let calendar = self.materialize_calendar(&loader, report).await?;

        let dimensions = loader.load_dimensions(dimension_rows(batch)).await?;
        report.dimensions = dimensions.summary;

        let candidates = {
            let transformer =
                FactTransformer::new(self.db, &calendar, self.config.dimension_policy)
                    .with_payments(&batch.payments);
            let orders: HashMap<&str, &RawOrder> = batch
                .orders
                .iter()
                .map(|order| (order.order_id.as_str(), order))
                .collect();

            let mut candidates = Vec::with_capacity(batch.order_items.len());
            for item in &batch.order_items {
                report.rows_processed += 1;

                let Some(&order) = orders.get(item.order_id.as_str()) else {
                    report.quarantined.push(line_entry(
                        None,
                        item,
                        QuarantineReason::OrphanOrderItem {
                            order_id: item.order_id.clone(),
                        },
                    ));
                    continue;
                };

                match transformer.transform(order, item).await {
                    Ok(candidate) => candidates.push(candidate),
                    Err(e) => match e.quarantine_reason() {
                        Some(reason) => {
                            report.quarantined.push(line_entry(Some(order), item, reason))
                        }
                        None => return Err(e),
                    },
                }
            }
            candidates
        };
        tracing::info!("Transformed {} order lines", candidates.len());

        let snapshot = KeySnapshot::capture(self.db, &candidates).await?;
        let (accepted, rejected) = ReferentialValidator::new(snapshot).validate_all(candidates);
        tracing::info!(
            "Validated order lines: {} accepted, {} quarantined",
            accepted.len(),
            rejected.len()
        );
        report.quarantined.extend(rejected);

        let facts = loader.load_facts(accepted).await?;
        report.facts = facts.summary;
        report.rows_loaded = facts.summary.inserted + facts.summary.updated;
        report.quarantined.extend(facts.rejected);

        Ok(())
    }

    /// Loads the configured calendar range and returns the date keys present.
    async fn materialize_calendar(
        &self,
        loader: &LoadCoordinator<'_>,
        report: &mut RunReport,
    ) -> Result<MaterializedCalendar, Error> {
        let range = &self.config.calendar;
        let rows: Vec<CalendarRow> = DateDimensionGenerator::new(range.seasons)
            .generate_range(range.start, range.end)
            .collect();

        let summary = loader.load_calendar(rows).await?;
        report.calendar_days = summary.total();

        let keys = CalendarRepository::new(self.db)
            .date_keys_between(range.start, range.end)
            .await?;

        Ok(MaterializedCalendar::new(keys))
    }

    async fn close_run(&self, run_id: i32, report: &RunReport) -> Result<(), Error> {
        let quarantined_at = report.finished_at.unwrap_or(report.started_at);
        QuarantineRepository::new(self.db)
            .insert_many(run_id, &report.quarantined, quarantined_at)
            .await?;
        RunRepository::new(self.db).finish(run_id, report).await?;

        Ok(())
    }
}

/// Dimension rows of a batch: customers, sellers, products and the locations
/// derived from customer and seller addresses.
fn dimension_rows(batch: &SourceBatch) -> Vec<DimensionAttributes> {
    let mut rows = Vec::new();
    let mut locations = Vec::new();

    for raw in &batch.customers {
        if raw.customer_id.trim().is_empty() {
            tracing::warn!("Skipping customer record without customer_id");
            continue;
        }
        let customer = CustomerAttributes::from_raw(raw);
        locations.push(DimensionAttributes::Location(customer.location()));
        rows.push(DimensionAttributes::Customer(customer));
    }
    for raw in &batch.sellers {
        if raw.seller_id.trim().is_empty() {
            tracing::warn!("Skipping seller record without seller_id");
            continue;
        }
        let seller = SellerAttributes::from_raw(raw);
        locations.push(DimensionAttributes::Location(seller.location()));
        rows.push(DimensionAttributes::Seller(seller));
    }
    for raw in &batch.products {
        if raw.product_id.trim().is_empty() {
            tracing::warn!("Skipping product record without product_id");
            continue;
        }
        rows.push(DimensionAttributes::Product(ProductAttributes::from_raw(raw)));
    }

    rows.extend(locations);
    rows
}

fn line_entry(
    order: Option<&RawOrder>,
    item: &RawOrderItem,
    reason: QuarantineReason,
) -> QuarantineEntry {
    QuarantineEntry {
        order_id: item.order_id.clone(),
        order_item_id: item.order_item_id,
        reasons: vec![reason],
        payload: serde_json::json!({ "order": order, "item": item }),
    }
}

#[cfg(test)]
mod tests;
