//! Reports returned by load, ingestion and pipeline runs.

use std::{collections::BTreeMap, fmt, ops::AddAssign};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::quarantine::{QuarantineEntry, ReasonCategory};

/// Inserted / updated / unchanged counts of an idempotent load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }

    /// Whether the load changed anything.
    pub fn wrote(&self) -> bool {
        self.inserted + self.updated > 0
    }
}

impl AddAssign for LoadSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.inserted += rhs.inserted;
        self.updated += rhs.updated;
        self.unchanged += rhs.unchanged;
    }
}

/// Result of loading a batch of validated facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactLoadReport {
    pub summary: LoadSummary,
    /// Facts that would have rewritten immutable fields; not applied.
    pub rejected: Vec<QuarantineEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedPrediction {
    /// Natural key (or keys) the prediction referenced.
    pub reference: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub ingested: usize,
    pub rejected: Vec<RejectedPrediction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one batch pipeline run, produced even when the run aborts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: Option<i32>,
    pub status: RunStatus,
    pub rows_processed: usize,
    pub rows_loaded: usize,
    pub facts: LoadSummary,
    pub dimensions: LoadSummary,
    pub calendar_days: usize,
    pub quarantined: Vec<QuarantineEntry>,
    pub abort_cause: Option<String>,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
}

impl RunReport {
    pub fn new(started_at: NaiveDateTime) -> Self {
        Self {
            run_id: None,
            status: RunStatus::Running,
            rows_processed: 0,
            rows_loaded: 0,
            facts: LoadSummary::default(),
            dimensions: LoadSummary::default(),
            calendar_days: 0,
            quarantined: Vec::new(),
            abort_cause: None,
            started_at,
            finished_at: None,
        }
    }

    /// Quarantined row counts per reason category.
    pub fn quarantine_breakdown(&self) -> BTreeMap<String, usize> {
        let mut breakdown = BTreeMap::new();
        for entry in &self.quarantined {
            for category in [
                ReasonCategory::ValidationFailure,
                ReasonCategory::UnresolvedDimensionReference,
                ReasonCategory::MissingDateDimensionRow,
            ] {
                if entry.has_reason(category) {
                    let label = serde_json::to_value(category)
                        .ok()
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_default();
                    *breakdown.entry(label).or_insert(0) += 1;
                }
            }
        }
        breakdown
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub customers: u64,
    pub products: u64,
    pub sellers: u64,
    pub locations: u64,
    pub facts: u64,
    pub calendar_days: u64,
    pub quarantined: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NullChecks {
    pub customers_without_natural_key: u64,
    pub facts_without_purchase_timestamp: u64,
    pub delivered_facts_without_delivery_date: u64,
}

/// Data quality summary of the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub generated_at: NaiveDateTime,
    pub record_counts: RecordCounts,
    pub null_checks: NullChecks,
    pub total_value_violations: u64,
    pub issues: u64,
    /// `100 - 10 * issues`, clamped to `0..=100`
    pub score: f64,
}
