//! Row-level rejection reasons.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::dimension::DimensionKind;

/// Which date of an order line a calendar lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRole {
    Order,
    Delivery,
}

impl fmt::Display for DateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order => f.write_str("order"),
            Self::Delivery => f.write_str("delivery"),
        }
    }
}

/// Coarse grouping of quarantine reasons for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCategory {
    ValidationFailure,
    UnresolvedDimensionReference,
    MissingDateDimensionRow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum QuarantineReason {
    UnresolvedDimensionReference {
        kind: DimensionKind,
        natural_key: String,
    },
    MissingDateDimensionRow {
        role: DateRole,
        date: NaiveDate,
    },
    NegativePrice {
        price: f64,
    },
    NegativeFreight {
        freight_value: f64,
    },
    TotalValueMismatch {
        total_value: f64,
        expected: f64,
    },
    MalformedIdentifier {
        field: String,
        value: String,
    },
    /// An order line whose order is not part of the batch.
    OrphanOrderItem {
        order_id: String,
    },
    /// A source record that could not be parsed; `line` is 1-based within `file`.
    MalformedRecord {
        file: String,
        line: u64,
        error: String,
    },
    /// A reload tried to change fields that are fixed once the fact is loaded.
    ImmutableFactRewrite {
        fields: Vec<String>,
    },
}

impl QuarantineReason {
    pub fn category(&self) -> ReasonCategory {
        match self {
            Self::UnresolvedDimensionReference { .. } => ReasonCategory::UnresolvedDimensionReference,
            Self::MissingDateDimensionRow { .. } => ReasonCategory::MissingDateDimensionRow,
            _ => ReasonCategory::ValidationFailure,
        }
    }
}

/// A rejected order line together with every reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineEntry {
    pub order_id: String,
    pub order_item_id: i32,
    pub reasons: Vec<QuarantineReason>,
    /// Snapshot of the rejected input, kept for later inspection.
    pub payload: serde_json::Value,
}

impl QuarantineEntry {
    pub fn has_reason(&self, category: ReasonCategory) -> bool {
        self.reasons.iter().any(|r| r.category() == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_serialize_with_tag() {
        let reason = QuarantineReason::UnresolvedDimensionReference {
            kind: DimensionKind::Customer,
            natural_key: "KH404".to_string(),
        };

        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["reason"], "unresolved_dimension_reference");
        assert_eq!(json["kind"], "customer");
        assert_eq!(
            reason.category(),
            ReasonCategory::UnresolvedDimensionReference
        );
    }
}
