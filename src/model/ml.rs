//! Prediction payloads produced by external models.
//!
//! Artifacts reference dimension rows by natural key; the integrator resolves
//! them to surrogate keys before appending result rows.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::util::time::deserialize_optional_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPrediction {
    pub customer_id: String,
    pub segment_id: i32,
    pub segment_name: String,
    #[serde(default)]
    pub segment_probability: Option<f64>,
    #[serde(default)]
    pub rfm_score: Option<i32>,
    #[serde(
        default,
        alias = "predicted_date",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub source_timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnPrediction {
    pub customer_id: String,
    pub churn_probability: f64,
    #[serde(default)]
    pub churn_risk: Option<String>,
    #[serde(
        default,
        alias = "predicted_date",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub source_timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifetimeValuePrediction {
    pub customer_id: String,
    pub predicted_value: f64,
    #[serde(default)]
    pub horizon_months: Option<i32>,
    #[serde(
        default,
        alias = "predicted_date",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub source_timestamp: Option<NaiveDateTime>,
}

/// An association rule over product natural keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBasketRule {
    pub antecedents: Vec<String>,
    pub consequents: Vec<String>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    #[serde(
        default,
        alias = "predicted_date",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub source_timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
}

impl ChurnRisk {
    /// `low` below 0.3, `high` from 0.7, `medium` in between.
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Self::Low
        } else if probability < 0.7 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ChurnRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
