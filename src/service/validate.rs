//! Referential validation of fact candidates.
//!
//! Validation is a pure function of a candidate and a [`KeySnapshot`] taken
//! after dimension resolution, so a batch is checked in parallel with rayon.
//! Every failing check contributes a tagged reason; a candidate is accepted
//! only when none fail.

use std::collections::HashSet;

use rayon::prelude::*;
use sea_orm::ConnectionTrait;

use crate::{
    data::calendar::CalendarRepository,
    error::Error,
    model::{
        dimension::DimensionKind,
        fact::{FactCandidate, ResolvedKeys, ValidatedFact},
        quarantine::{DateRole, QuarantineEntry, QuarantineReason},
    },
    service::dimension::DimensionBuilder,
};

/// Tolerance of the `total_value == price + freight_value` check.
const TOTAL_VALUE_EPSILON: f64 = 1e-6;

/// Surrogate and date keys known to exist when the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeySnapshot {
    pub customers: HashSet<i32>,
    pub products: HashSet<i32>,
    pub sellers: HashSet<i32>,
    pub locations: HashSet<i32>,
    pub dates: HashSet<i32>,
}

impl KeySnapshot {
    /// Captures the keys referenced by `candidates` that exist in the warehouse.
    pub async fn capture<C: ConnectionTrait>(
        db: &C,
        candidates: &[FactCandidate],
    ) -> Result<Self, Error> {
        let dimensions = DimensionBuilder::new(db);

        let referenced = |f: fn(&FactCandidate) -> Option<i32>| -> Vec<i32> {
            let keys: HashSet<i32> = candidates.iter().filter_map(f).collect();
            keys.into_iter().collect()
        };

        let date_keys: HashSet<i32> = candidates
            .iter()
            .flat_map(|c| std::iter::once(c.order_date_key).chain(c.delivery_date_key))
            .collect();
        let date_keys: Vec<i32> = date_keys.into_iter().collect();

        Ok(Self {
            customers: dimensions
                .existing_keys(DimensionKind::Customer, &referenced(|c| c.customer_key))
                .await?,
            products: dimensions
                .existing_keys(DimensionKind::Product, &referenced(|c| c.product_key))
                .await?,
            sellers: dimensions
                .existing_keys(DimensionKind::Seller, &referenced(|c| c.seller_key))
                .await?,
            locations: dimensions
                .existing_keys(DimensionKind::Location, &referenced(|c| c.location_key))
                .await?,
            dates: CalendarRepository::new(db)
                .find_by_date_keys(&date_keys)
                .await?
                .into_iter()
                .map(|row| row.date_key)
                .collect(),
        })
    }

    fn dimension(&self, kind: DimensionKind) -> &HashSet<i32> {
        match kind {
            DimensionKind::Customer => &self.customers,
            DimensionKind::Product => &self.products,
            DimensionKind::Seller => &self.sellers,
            DimensionKind::Location => &self.locations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Accepted(ValidatedFact),
    Quarantined(QuarantineEntry),
}

#[derive(Debug, Clone)]
pub struct ReferentialValidator {
    snapshot: KeySnapshot,
}

impl ReferentialValidator {
    pub fn new(snapshot: KeySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn validate(&self, candidate: FactCandidate) -> Validation {
        let mut reasons = Vec::new();

        let customer_key = self.check_key(
            &mut reasons,
            DimensionKind::Customer,
            candidate.customer_key,
            &candidate.customer_id,
        );
        let product_key = self.check_key(
            &mut reasons,
            DimensionKind::Product,
            candidate.product_key,
            &candidate.product_id,
        );
        let seller_key = self.check_key(
            &mut reasons,
            DimensionKind::Seller,
            candidate.seller_key,
            &candidate.seller_id,
        );
        let location_key = self.check_key(
            &mut reasons,
            DimensionKind::Location,
            candidate.location_key,
            &candidate.location_id,
        );

        if !self.snapshot.dates.contains(&candidate.order_date_key) {
            reasons.push(QuarantineReason::MissingDateDimensionRow {
                role: DateRole::Order,
                date: candidate.order_purchase_timestamp.date(),
            });
        }
        if let (Some(key), Some(delivered)) = (
            candidate.delivery_date_key,
            candidate.order_delivered_customer_date,
        ) {
            if !self.snapshot.dates.contains(&key) {
                reasons.push(QuarantineReason::MissingDateDimensionRow {
                    role: DateRole::Delivery,
                    date: delivered.date(),
                });
            }
        }

        reasons.extend(check_amounts(&candidate));
        reasons.extend(check_identifiers(&candidate));

        match (customer_key, product_key, seller_key, location_key) {
            (Some(customer_key), Some(product_key), Some(seller_key), Some(location_key))
                if reasons.is_empty() =>
            {
                Validation::Accepted(ValidatedFact {
                    candidate,
                    keys: ResolvedKeys {
                        customer_key,
                        product_key,
                        seller_key,
                        location_key,
                    },
                })
            }
            _ => Validation::Quarantined(quarantine_entry(&candidate, reasons)),
        }
    }

    /// Validates a batch in parallel, keeping input order within each side.
    pub fn validate_all(
        &self,
        candidates: Vec<FactCandidate>,
    ) -> (Vec<ValidatedFact>, Vec<QuarantineEntry>) {
        let results: Vec<Validation> = candidates
            .into_par_iter()
            .map(|candidate| self.validate(candidate))
            .collect();

        let mut accepted = Vec::with_capacity(results.len());
        let mut quarantined = Vec::new();
        for result in results {
            match result {
                Validation::Accepted(fact) => accepted.push(fact),
                Validation::Quarantined(entry) => quarantined.push(entry),
            }
        }

        (accepted, quarantined)
    }

    fn check_key(
        &self,
        reasons: &mut Vec<QuarantineReason>,
        kind: DimensionKind,
        key: Option<i32>,
        natural_key: &str,
    ) -> Option<i32> {
        match key {
            Some(key) if self.snapshot.dimension(kind).contains(&key) => Some(key),
            _ => {
                reasons.push(QuarantineReason::UnresolvedDimensionReference {
                    kind,
                    natural_key: natural_key.to_string(),
                });
                None
            }
        }
    }
}

fn check_amounts(candidate: &FactCandidate) -> Vec<QuarantineReason> {
    let mut reasons = Vec::new();

    if candidate.price < 0.0 || candidate.price.is_nan() {
        reasons.push(QuarantineReason::NegativePrice {
            price: candidate.price,
        });
    }
    if candidate.freight_value < 0.0 || candidate.freight_value.is_nan() {
        reasons.push(QuarantineReason::NegativeFreight {
            freight_value: candidate.freight_value,
        });
    }

    let expected = candidate.price + candidate.freight_value;
    let drift = (candidate.total_value - expected).abs();
    if drift > TOTAL_VALUE_EPSILON || drift.is_nan() {
        reasons.push(QuarantineReason::TotalValueMismatch {
            total_value: candidate.total_value,
            expected,
        });
    }

    reasons
}

fn check_identifiers(candidate: &FactCandidate) -> Vec<QuarantineReason> {
    let mut reasons = Vec::new();

    let order_id = &candidate.order_id;
    if order_id.is_empty() || order_id.trim() != order_id {
        reasons.push(QuarantineReason::MalformedIdentifier {
            field: "order_id".to_string(),
            value: order_id.clone(),
        });
    }
    if candidate.order_item_id < 1 {
        reasons.push(QuarantineReason::MalformedIdentifier {
            field: "order_item_id".to_string(),
            value: candidate.order_item_id.to_string(),
        });
    }

    reasons
}

/// Builds the quarantine entry for a rejected candidate.
pub fn quarantine_entry(candidate: &FactCandidate, reasons: Vec<QuarantineReason>) -> QuarantineEntry {
    QuarantineEntry {
        order_id: candidate.order_id.clone(),
        order_item_id: candidate.order_item_id,
        reasons,
        payload: serde_json::to_value(candidate).unwrap_or(serde_json::Value::Null),
    }
}
