//! Aggregated projections over the current warehouse state.
//!
//! Projections are recomputed from facts, dimensions and the latest ML rows.
//! The view caches one snapshot tagged with the warehouse epoch it was built
//! at and rebuilds it once any load has moved the epoch.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::NaiveDateTime;
use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::{
    data::{
        fact::FactRepository,
        ml::{ChurnPredictionRepository, CustomerSegmentRepository, LifetimeValueRepository},
    },
    error::Error,
    model::dimension::DimensionKind,
    service::{dimension::DimensionBuilder, load::WarehouseEpoch},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer_key: i32,
    pub customer_id: String,
    pub order_count: usize,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub first_order_at: NaiveDateTime,
    pub last_order_at: NaiveDateTime,
    pub latest_churn_probability: Option<f64>,
    pub latest_lifetime_value: Option<f64>,
    pub latest_segment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product_key: i32,
    pub product_id: String,
    pub order_count: usize,
    /// Order lines sold
    pub units: usize,
    pub revenue: f64,
    pub unique_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date_key: i32,
    pub order_count: usize,
    pub revenue: f64,
    pub average_order_value: f64,
    pub unique_customers: usize,
}

/// Latest ML results per customer key.
#[derive(Debug, Clone, Default)]
pub struct LatestPredictions {
    pub churn_probability: HashMap<i32, f64>,
    pub lifetime_value: HashMap<i32, f64>,
    pub segment: HashMap<i32, String>,
}

/// Every projection, computed at one warehouse epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub epoch: u64,
    pub customers: Vec<CustomerSummary>,
    pub products: Vec<ProductSummary>,
    pub daily: Vec<DailySales>,
}

pub struct AnalyticsView<'a, C: ConnectionTrait> {
    db: &'a C,
    epoch: WarehouseEpoch,
    cache: Mutex<Option<Arc<AnalyticsSnapshot>>>,
}

impl<'a, C: ConnectionTrait> AnalyticsView<'a, C> {
    pub fn new(db: &'a C, epoch: WarehouseEpoch) -> Self {
        Self {
            db,
            epoch,
            cache: Mutex::new(None),
        }
    }

    /// Current projections, rebuilt when the epoch moved since the cached snapshot.
    pub async fn snapshot(&self) -> Result<Arc<AnalyticsSnapshot>, Error> {
        let epoch = self.epoch.current();
        if let Some(cached) = self.cached(epoch) {
            return Ok(cached);
        }

        tracing::debug!("Rebuilding analytics snapshot at epoch {}", epoch);
        let snapshot = Arc::new(self.compute(epoch).await?);
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());

        Ok(snapshot)
    }

    pub async fn customer_summaries(&self) -> Result<Vec<CustomerSummary>, Error> {
        Ok(self.snapshot().await?.customers.clone())
    }

    pub async fn product_summaries(&self) -> Result<Vec<ProductSummary>, Error> {
        Ok(self.snapshot().await?.products.clone())
    }

    pub async fn daily_sales(&self) -> Result<Vec<DailySales>, Error> {
        Ok(self.snapshot().await?.daily.clone())
    }

    /// Drops the cached snapshot so the next read recomputes it.
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn cached(&self, epoch: u64) -> Option<Arc<AnalyticsSnapshot>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|snapshot| snapshot.epoch == epoch)
            .cloned()
    }

    async fn compute(&self, epoch: u64) -> Result<AnalyticsSnapshot, Error> {
        let dimensions = DimensionBuilder::new(self.db);
        let churn = ChurnPredictionRepository::new(self.db);
        let lifetime = LifetimeValueRepository::new(self.db);
        let segments = CustomerSegmentRepository::new(self.db);

        let (facts, customers, products) = futures::try_join!(
            async { Ok::<_, Error>(FactRepository::new(self.db).all().await?) },
            dimensions.natural_keys(DimensionKind::Customer),
            dimensions.natural_keys(DimensionKind::Product),
        )?;
        let (churn, lifetime, segments) = futures::try_join!(
            churn.latest_per_customer(),
            lifetime.latest_per_customer(),
            segments.latest_per_customer(),
        )?;

        let latest = LatestPredictions {
            churn_probability: churn
                .into_iter()
                .map(|(key, row)| (key, row.churn_probability))
                .collect(),
            lifetime_value: lifetime
                .into_iter()
                .map(|(key, row)| (key, row.predicted_value))
                .collect(),
            segment: segments
                .into_iter()
                .map(|(key, row)| (key, row.segment_name))
                .collect(),
        };

        Ok(AnalyticsSnapshot {
            epoch,
            customers: customer_summaries(&facts, &customers, &latest),
            products: product_summaries(&facts, &products),
            daily: daily_sales(&facts),
        })
    }
}

/// Per-customer projection, highest revenue first.
pub fn customer_summaries(
    facts: &[entity::fact_sales::Model],
    customer_ids: &HashMap<i32, String>,
    latest: &LatestPredictions,
) -> Vec<CustomerSummary> {
    struct Acc<'f> {
        orders: HashSet<&'f str>,
        revenue: f64,
        first: NaiveDateTime,
        last: NaiveDateTime,
    }

    let mut by_customer: HashMap<i32, Acc> = HashMap::new();
    for fact in facts {
        let at = fact.order_purchase_timestamp;
        let acc = by_customer.entry(fact.customer_key).or_insert_with(|| Acc {
            orders: HashSet::new(),
            revenue: 0.0,
            first: at,
            last: at,
        });
        acc.orders.insert(&fact.order_id);
        acc.revenue += fact.total_value;
        acc.first = acc.first.min(at);
        acc.last = acc.last.max(at);
    }

    let mut summaries: Vec<CustomerSummary> = by_customer
        .into_iter()
        .map(|(key, acc)| CustomerSummary {
            customer_key: key,
            customer_id: customer_ids.get(&key).cloned().unwrap_or_default(),
            order_count: acc.orders.len(),
            total_revenue: acc.revenue,
            average_order_value: acc.revenue / acc.orders.len() as f64,
            first_order_at: acc.first,
            last_order_at: acc.last,
            latest_churn_probability: latest.churn_probability.get(&key).copied(),
            latest_lifetime_value: latest.lifetime_value.get(&key).copied(),
            latest_segment: latest.segment.get(&key).cloned(),
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    summaries
}

/// Per-product projection, highest revenue first.
pub fn product_summaries(
    facts: &[entity::fact_sales::Model],
    product_ids: &HashMap<i32, String>,
) -> Vec<ProductSummary> {
    #[derive(Default)]
    struct Acc<'f> {
        orders: HashSet<&'f str>,
        customers: HashSet<i32>,
        units: usize,
        revenue: f64,
    }

    let mut by_product: HashMap<i32, Acc> = HashMap::new();
    for fact in facts {
        let acc = by_product.entry(fact.product_key).or_default();
        acc.orders.insert(&fact.order_id);
        acc.customers.insert(fact.customer_key);
        acc.units += 1;
        acc.revenue += fact.price;
    }

    let mut summaries: Vec<ProductSummary> = by_product
        .into_iter()
        .map(|(key, acc)| ProductSummary {
            product_key: key,
            product_id: product_ids.get(&key).cloned().unwrap_or_default(),
            order_count: acc.orders.len(),
            units: acc.units,
            revenue: acc.revenue,
            unique_customers: acc.customers.len(),
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    summaries
}

/// Per-day projection keyed by order date, oldest first.
pub fn daily_sales(facts: &[entity::fact_sales::Model]) -> Vec<DailySales> {
    #[derive(Default)]
    struct Acc<'f> {
        orders: HashSet<&'f str>,
        customers: HashSet<i32>,
        revenue: f64,
    }

    let mut by_day: BTreeMap<i32, Acc> = BTreeMap::new();
    for fact in facts {
        let acc = by_day.entry(fact.order_date_key).or_default();
        acc.orders.insert(&fact.order_id);
        acc.customers.insert(fact.customer_key);
        acc.revenue += fact.total_value;
    }

    by_day
        .into_iter()
        .map(|(date_key, acc)| DailySales {
            date_key,
            order_count: acc.orders.len(),
            revenue: acc.revenue,
            average_order_value: acc.revenue / acc.orders.len() as f64,
            unique_customers: acc.customers.len(),
        })
        .collect()
}
