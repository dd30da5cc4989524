//! Sales fact candidates.

use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, IntoActiveModel};
use serde::{Deserialize, Serialize};

/// Metrics derived from the order timestamps.
///
/// Every metric is `None` while the inputs it depends on are unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub delivery_delay_days: Option<i32>,
    pub processing_time_hours: Option<i32>,
    pub is_delivered_ontime: Option<bool>,
    pub is_fast_delivery: Option<bool>,
}

/// A fact row produced by the transformer, before validation.
///
/// Surrogate keys are `None` when the referenced dimension row could not be
/// resolved; the validator quarantines such candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCandidate {
    pub order_id: String,
    pub order_item_id: i32,
    pub customer_id: String,
    pub product_id: String,
    pub seller_id: String,
    pub location_id: String,
    pub customer_key: Option<i32>,
    pub product_key: Option<i32>,
    pub seller_key: Option<i32>,
    pub location_key: Option<i32>,
    pub order_date_key: i32,
    pub delivery_date_key: Option<i32>,
    pub order_status: String,
    pub price: f64,
    pub freight_value: f64,
    pub total_value: f64,
    pub payment_installments: i32,
    pub order_purchase_timestamp: NaiveDateTime,
    pub order_approved_at: Option<NaiveDateTime>,
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
    pub metrics: DerivedMetrics,
}

/// Surrogate keys of a candidate that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedKeys {
    pub customer_key: i32,
    pub product_key: i32,
    pub seller_key: i32,
    pub location_key: i32,
}

/// A candidate accepted by the referential validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFact {
    pub candidate: FactCandidate,
    pub keys: ResolvedKeys,
}

impl ValidatedFact {
    pub fn key(&self) -> (&str, i32) {
        (&self.candidate.order_id, self.candidate.order_item_id)
    }

    pub fn to_model(&self, now: NaiveDateTime) -> entity::fact_sales::Model {
        let c = &self.candidate;
        entity::fact_sales::Model {
            order_id: c.order_id.clone(),
            order_item_id: c.order_item_id,
            customer_key: self.keys.customer_key,
            product_key: self.keys.product_key,
            seller_key: self.keys.seller_key,
            location_key: self.keys.location_key,
            order_date_key: c.order_date_key,
            delivery_date_key: c.delivery_date_key,
            order_status: c.order_status.clone(),
            price: c.price,
            freight_value: c.freight_value,
            total_value: c.total_value,
            payment_installments: c.payment_installments,
            order_purchase_timestamp: c.order_purchase_timestamp,
            order_approved_at: c.order_approved_at,
            order_delivered_carrier_date: c.order_delivered_carrier_date,
            order_delivered_customer_date: c.order_delivered_customer_date,
            order_estimated_delivery_date: c.order_estimated_delivery_date,
            delivery_delay_days: c.metrics.delivery_delay_days,
            processing_time_hours: c.metrics.processing_time_hours,
            is_delivered_ontime: c.metrics.is_delivered_ontime,
            is_fast_delivery: c.metrics.is_fast_delivery,
            created_date: now,
            updated_date: now,
        }
    }

    /// Insertable model with every column set.
    pub fn to_active_model(&self, now: NaiveDateTime) -> entity::fact_sales::ActiveModel {
        self.to_model(now).into_active_model().reset_all()
    }
}
