//! Raw source records.
//!
//! Field names follow the CSV headers of the source extracts. Unknown columns
//! are ignored; optional columns may be absent entirely.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::util::time::{deserialize_optional_timestamp, deserialize_timestamp};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCustomer {
    pub customer_id: String,
    pub customer_unique_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
    pub customer_zip_code_prefix: Option<String>,
    pub customer_region: Option<String>,
    pub customer_tier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSeller {
    pub seller_id: String,
    pub seller_name: Option<String>,
    pub seller_city: Option<String>,
    pub seller_state: Option<String>,
    pub seller_zip_code_prefix: Option<String>,
    pub seller_region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    pub product_id: String,
    pub product_category_name: Option<String>,
    pub product_weight_g: Option<f64>,
    pub product_length_cm: Option<f64>,
    pub product_height_cm: Option<f64>,
    pub product_width_cm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: String,
    pub customer_id: String,
    pub order_status: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub order_purchase_timestamp: NaiveDateTime,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub order_approved_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrderItem {
    pub order_id: String,
    pub order_item_id: i32,
    pub product_id: String,
    pub seller_id: String,
    pub price: f64,
    pub freight_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayment {
    pub order_id: String,
    #[serde(default)]
    pub payment_sequential: Option<i32>,
    #[serde(default)]
    pub payment_type: Option<String>,
    pub payment_installments: i32,
    #[serde(default)]
    pub payment_value: Option<f64>,
}
