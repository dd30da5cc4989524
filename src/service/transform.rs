//! Fact transformation.
//!
//! Turns one raw order line into a [`FactCandidate`]: dimension references are
//! resolved to surrogate keys, order and delivery dates to calendar keys, and
//! delivery metrics are derived from the order timestamps. Nothing here writes
//! facts; candidates go to the validator next.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::ConnectionTrait;

use crate::{
    config::DimensionPolicy,
    error::{warehouse::WarehouseError, Error},
    model::{
        dimension::{
            CustomerAttributes, DimensionAttributes, DimensionKind, LocationAttributes,
            ProductAttributes, SellerAttributes,
        },
        fact::{DerivedMetrics, FactCandidate},
        quarantine::DateRole,
        raw::{RawOrder, RawOrderItem, RawPayment},
    },
    service::dimension::DimensionBuilder,
    util::time::date_key,
};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Date keys present in the date dimension.
#[derive(Debug, Clone, Default)]
pub struct MaterializedCalendar {
    keys: HashSet<i32>,
}

impl MaterializedCalendar {
    pub fn new(keys: HashSet<i32>) -> Self {
        Self { keys }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.keys.contains(&date_key(date))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Calendar key for a date of the given role, failing when the day is not materialized.
    pub fn resolve(&self, role: DateRole, date: NaiveDate) -> Result<i32, Error> {
        if self.contains(date) {
            Ok(date_key(date))
        } else {
            Err(WarehouseError::MissingDateDimensionRow { role, date }.into())
        }
    }
}

/// Sum of payment installments per order id.
pub fn installments_by_order(payments: &[RawPayment]) -> HashMap<String, i32> {
    let mut installments = HashMap::new();
    for payment in payments {
        *installments.entry(payment.order_id.clone()).or_insert(0) += payment.payment_installments;
    }
    installments
}

/// Derives delivery metrics from the order timestamps.
///
/// - processing time: whole hours between purchase and approval, truncated
/// - delivery delay: days between delivery and estimate, floored
/// - on time: delay of at most zero days
/// - fast: delivered strictly before the estimate
pub fn derive_metrics(
    purchased_at: NaiveDateTime,
    approved_at: Option<NaiveDateTime>,
    delivered_at: Option<NaiveDateTime>,
    estimated_at: Option<NaiveDateTime>,
) -> DerivedMetrics {
    let processing_time_hours =
        approved_at.map(|approved| ((approved - purchased_at).num_seconds() / 3600) as i32);

    let delivery = delivered_at.zip(estimated_at);
    let delivery_delay_days = delivery.map(|(delivered, estimated)| {
        (delivered - estimated)
            .num_milliseconds()
            .div_euclid(MILLIS_PER_DAY) as i32
    });

    DerivedMetrics {
        delivery_delay_days,
        processing_time_hours,
        is_delivered_ontime: delivery_delay_days.map(|days| days <= 0),
        is_fast_delivery: delivery.map(|(delivered, estimated)| delivered < estimated),
    }
}

pub struct FactTransformer<'a, C: ConnectionTrait> {
    dimensions: DimensionBuilder<'a, C>,
    calendar: &'a MaterializedCalendar,
    policy: DimensionPolicy,
    installments: HashMap<String, i32>,
}

impl<'a, C: ConnectionTrait> FactTransformer<'a, C> {
    pub fn new(db: &'a C, calendar: &'a MaterializedCalendar, policy: DimensionPolicy) -> Self {
        Self {
            dimensions: DimensionBuilder::new(db),
            calendar,
            policy,
            installments: HashMap::new(),
        }
    }

    /// Uses the batch's payments to fill `payment_installments`.
    pub fn with_payments(mut self, payments: &[RawPayment]) -> Self {
        self.installments = installments_by_order(payments);
        self
    }

    /// Builds the fact candidate for one order line.
    ///
    /// # Returns
    /// - `Ok(FactCandidate)` - Candidate with every resolvable key filled in
    /// - `Err(WarehouseError::MissingDateDimensionRow)` - Order or delivery date outside the calendar
    /// - `Err(Error)` - Dimension resolution failed
    pub async fn transform(
        &self,
        order: &RawOrder,
        item: &RawOrderItem,
    ) -> Result<FactCandidate, Error> {
        let order_date_key = self
            .calendar
            .resolve(DateRole::Order, order.order_purchase_timestamp.date())?;
        let delivery_date_key = order
            .order_delivered_customer_date
            .map(|delivered| self.calendar.resolve(DateRole::Delivery, delivered.date()))
            .transpose()?;

        let customer_id = order.customer_id.trim();
        let (customer_key, location) = self.resolve_customer(customer_id).await?;
        let location_key = self
            .resolve(DimensionAttributes::Location(location.clone()))
            .await?;
        let product_key = self
            .resolve(DimensionAttributes::Product(ProductAttributes::placeholder(
                item.product_id.trim(),
            )))
            .await?;
        let seller_key = self
            .resolve(DimensionAttributes::Seller(SellerAttributes::placeholder(
                item.seller_id.trim(),
            )))
            .await?;

        let metrics = derive_metrics(
            order.order_purchase_timestamp,
            order.order_approved_at,
            order.order_delivered_customer_date,
            order.order_estimated_delivery_date,
        );

        Ok(FactCandidate {
            order_id: item.order_id.clone(),
            order_item_id: item.order_item_id,
            customer_id: customer_id.to_string(),
            product_id: item.product_id.trim().to_string(),
            seller_id: item.seller_id.trim().to_string(),
            location_id: location.location_id,
            customer_key,
            product_key,
            seller_key,
            location_key,
            order_date_key,
            delivery_date_key,
            order_status: order.order_status.clone(),
            price: item.price,
            freight_value: item.freight_value,
            total_value: item.price + item.freight_value,
            payment_installments: self
                .installments
                .get(&order.order_id)
                .copied()
                .unwrap_or(1),
            order_purchase_timestamp: order.order_purchase_timestamp,
            order_approved_at: order.order_approved_at,
            order_delivered_carrier_date: order.order_delivered_carrier_date,
            order_delivered_customer_date: order.order_delivered_customer_date,
            order_estimated_delivery_date: order.order_estimated_delivery_date,
            metrics,
        })
    }

    /// Resolves the customer and the location derived from its stored address.
    async fn resolve_customer(
        &self,
        customer_id: &str,
    ) -> Result<(Option<i32>, LocationAttributes), Error> {
        if let Some(stored) = self.dimensions.find_customer(customer_id).await? {
            let key = stored.is_active.then_some(stored.surrogate_key);
            return Ok((key, stored.attributes.location()));
        }

        let placeholder = CustomerAttributes::placeholder(customer_id);
        let location = placeholder.location();
        let key = match self.policy {
            DimensionPolicy::LookupOnly => None,
            DimensionPolicy::Implicit => {
                tracing::debug!("Creating implicit customer {:?}", customer_id);
                Some(
                    self.dimensions
                        .resolve_or_create(DimensionAttributes::Customer(placeholder))
                        .await?,
                )
            }
        };

        Ok((key, location))
    }

    /// Resolves a product, seller or location reference.
    ///
    /// Deactivated rows resolve to `None` under either policy and are never revived.
    async fn resolve(&self, attributes: DimensionAttributes) -> Result<Option<i32>, Error> {
        let kind: DimensionKind = attributes.kind();
        match self
            .dimensions
            .find_key(kind, attributes.natural_key())
            .await?
        {
            Some((key, true)) => return Ok(Some(key)),
            Some((_, false)) => return Ok(None),
            None => {}
        }

        match self.policy {
            DimensionPolicy::LookupOnly => Ok(None),
            DimensionPolicy::Implicit => {
                tracing::debug!(
                    "Creating implicit {} {:?}",
                    kind,
                    attributes.natural_key()
                );
                Ok(Some(self.dimensions.resolve_or_create(attributes).await?))
            }
        }
    }
}
