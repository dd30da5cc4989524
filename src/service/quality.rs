//! Warehouse data quality checks.

use chrono::Utc;
use sea_orm::ConnectionTrait;

use crate::{
    data::{
        calendar::CalendarRepository, dimension::CustomerRepository, fact::FactRepository,
        quarantine::QuarantineRepository,
    },
    error::Error,
    model::{
        dimension::DimensionKind,
        report::{NullChecks, QualityReport, RecordCounts},
    },
    service::dimension::DimensionBuilder,
};

const TOTAL_VALUE_EPSILON: f64 = 1e-6;
const ISSUE_PENALTY: f64 = 10.0;

pub struct QualityService<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> QualityService<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Counts rows, runs the null checks and the `total_value` invariant, and scores the result.
    ///
    /// Every failing null check and every fact violating the invariant counts as one issue.
    pub async fn run_checks(&self) -> Result<QualityReport, Error> {
        let dimensions = DimensionBuilder::new(self.db);
        let facts = FactRepository::new(self.db);

        let record_counts = RecordCounts {
            customers: dimensions.count(DimensionKind::Customer).await?,
            products: dimensions.count(DimensionKind::Product).await?,
            sellers: dimensions.count(DimensionKind::Seller).await?,
            locations: dimensions.count(DimensionKind::Location).await?,
            facts: facts.count().await?,
            calendar_days: CalendarRepository::new(self.db).count().await?,
            quarantined: QuarantineRepository::new(self.db).count().await?,
        };

        let null_checks = NullChecks {
            customers_without_natural_key: CustomerRepository::new(self.db)
                .count_without_natural_key()
                .await?,
            facts_without_purchase_timestamp: facts.count_without_purchase_timestamp().await?,
            delivered_facts_without_delivery_date: facts
                .count_delivered_without_delivery_date()
                .await?,
        };

        let total_value_violations = facts
            .amounts()
            .await?
            .into_iter()
            .filter(|(price, freight, total)| {
                (total - (price + freight)).abs() > TOTAL_VALUE_EPSILON
            })
            .count() as u64;

        let issues = null_checks.customers_without_natural_key
            + null_checks.facts_without_purchase_timestamp
            + null_checks.delivered_facts_without_delivery_date
            + total_value_violations;

        let report = QualityReport {
            generated_at: Utc::now().naive_utc(),
            record_counts,
            null_checks,
            total_value_violations,
            issues,
            score: score(issues),
        };

        if report.issues > 0 {
            tracing::warn!(
                "Quality checks found {} issue(s), score {:.0}",
                report.issues,
                report.score
            );
        } else {
            tracing::info!("Quality checks passed, score {:.0}", report.score);
        }

        Ok(report)
    }
}

/// `100 - 10 * issues`, clamped to `0..=100`.
pub fn score(issues: u64) -> f64 {
    (100.0 - ISSUE_PENALTY * issues as f64).clamp(0.0, 100.0)
}
