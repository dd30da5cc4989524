//! Tests for LoadCoordinator.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use storehouse_test_utils::prelude::*;

use super::*;
use crate::{
    config::RetryConfig,
    model::{
        dimension::{CustomerAttributes, DimensionKind},
        fact::{DerivedMetrics, FactCandidate, ResolvedKeys},
        quarantine::ReasonCategory,
    },
    service::calendar::DateDimensionGenerator,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn coordinator(test: &TestContext) -> LoadCoordinator<'_> {
    let retry = RetryContext::from_config(&RetryConfig {
        max_attempts: 2,
        initial_backoff: Duration::from_millis(1),
    });
    LoadCoordinator::new(&test.db, retry, WarehouseEpoch::new())
}

/// Builds a warehouse with one row per dimension and returns an undelivered fact over them.
async fn fact_fixture() -> Result<(TestContext, ValidatedFact), TestError> {
    let test = TestBuilder::new()
        .with_warehouse_tables()
        .with_mock_calendar(day(2022, 1, 1), day(2022, 1, 31))
        .build()
        .await?;
    let warehouse = test.warehouse();
    let customer = warehouse.insert_mock_customer("KH1").await?;
    let product = warehouse.insert_mock_product("SP1").await?;
    let seller = warehouse.insert_mock_seller("NB1").await?;
    let location = warehouse.insert_mock_location("01001|sao paulo|SP").await?;

    let fact = ValidatedFact {
        candidate: FactCandidate {
            order_id: "DH1".to_string(),
            order_item_id: 1,
            customer_id: "KH1".to_string(),
            product_id: "SP1".to_string(),
            seller_id: "NB1".to_string(),
            location_id: "01001|sao paulo|SP".to_string(),
            customer_key: Some(customer.customer_key),
            product_key: Some(product.product_key),
            seller_key: Some(seller.seller_key),
            location_key: Some(location.location_key),
            order_date_key: 20220101,
            delivery_date_key: None,
            order_status: "shipped".to_string(),
            price: 100.0,
            freight_value: 10.0,
            total_value: 110.0,
            payment_installments: 1,
            order_purchase_timestamp: ts("2022-01-01 10:00:00"),
            order_approved_at: Some(ts("2022-01-01 11:00:00")),
            order_delivered_carrier_date: None,
            order_delivered_customer_date: None,
            order_estimated_delivery_date: Some(ts("2022-01-06 00:00:00")),
            metrics: DerivedMetrics {
                processing_time_hours: Some(1),
                ..Default::default()
            },
        },
        keys: ResolvedKeys {
            customer_key: customer.customer_key,
            product_key: product.product_key,
            seller_key: seller.seller_key,
            location_key: location.location_key,
        },
    };

    Ok((test, fact))
}

/// Tests loading the same calendar range twice.
///
/// Expected: all days inserted once, then unchanged; the epoch moves once
#[tokio::test]
async fn calendar_load_is_idempotent() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let loader = coordinator(&test);
    let rows: Vec<_> = DateDimensionGenerator::default()
        .generate_range(day(2022, 1, 1), day(2022, 1, 10))
        .collect();

    let first = loader.load_calendar(rows.clone()).await.expect("first load");
    let second = loader.load_calendar(rows).await.expect("second load");

    assert_eq!(first.inserted, 10);
    assert_eq!(second.unchanged, 10);
    assert!(!second.wrote());
    assert_eq!(loader.epoch().current(), 1);

    Ok(())
}

/// Tests that dimension loads report counts and keys.
#[tokio::test]
async fn dimension_load_reports_counts() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let loader = coordinator(&test);
    let customer = |id: &str| {
        DimensionAttributes::Customer(CustomerAttributes {
            city: Some("santos".to_string()),
            ..CustomerAttributes::placeholder(id)
        })
    };

    let upsert = loader
        .load_dimensions(vec![customer("KH1"), customer("KH2")])
        .await
        .expect("load failed");

    assert_eq!(upsert.summary.inserted, 2);
    assert!(upsert.key(DimensionKind::Customer, "KH2").is_some());

    Ok(())
}

/// Tests re-submitting an identical fact.
///
/// Expected: inserted once, unchanged on resubmission with updated_date untouched
#[tokio::test]
async fn fact_resubmission_is_unchanged() -> Result<(), TestError> {
    let (test, fact) = fact_fixture().await?;
    let loader = coordinator(&test);

    let first = loader.load_facts(vec![fact.clone()]).await.expect("first load");
    let before = FactRepository::new(&test.db).all().await?;
    let second = loader.load_facts(vec![fact]).await.expect("second load");
    let after = FactRepository::new(&test.db).all().await?;

    assert_eq!(first.summary.inserted, 1);
    assert_eq!(second.summary.unchanged, 1);
    assert!(second.rejected.is_empty());
    assert_eq!(after.len(), 1);
    assert_eq!(before, after);

    Ok(())
}

/// Tests delivery confirmation arriving after the first load.
///
/// Expected: null delivery fields and the status are backfilled in place
#[tokio::test]
async fn delivery_confirmation_is_backfilled() -> Result<(), TestError> {
    let (test, fact) = fact_fixture().await?;
    let loader = coordinator(&test);
    loader.load_facts(vec![fact.clone()]).await.expect("first load");

    let mut delivered = fact;
    delivered.candidate.order_status = "delivered".to_string();
    delivered.candidate.order_delivered_customer_date = Some(ts("2022-01-05 15:00:00"));
    delivered.candidate.delivery_date_key = Some(20220105);
    delivered.candidate.metrics.delivery_delay_days = Some(-1);
    delivered.candidate.metrics.is_delivered_ontime = Some(true);
    delivered.candidate.metrics.is_fast_delivery = Some(true);

    let report = loader.load_facts(vec![delivered]).await.expect("backfill");
    let stored = FactRepository::new(&test.db).all().await?;

    assert_eq!(report.summary.updated, 1);
    assert_eq!(stored[0].order_status, "delivered");
    assert_eq!(stored[0].delivery_date_key, Some(20220105));
    assert_eq!(stored[0].is_delivered_ontime, Some(true));
    assert_eq!(stored[0].processing_time_hours, Some(1));

    Ok(())
}

/// Tests a reload that changes an immutable field.
///
/// Expected: not applied, returned as an ImmutableFactRewrite rejection
#[tokio::test]
async fn immutable_rewrite_is_rejected() -> Result<(), TestError> {
    let (test, fact) = fact_fixture().await?;
    let loader = coordinator(&test);
    loader.load_facts(vec![fact.clone()]).await.expect("first load");

    let mut repriced = fact;
    repriced.candidate.price = 90.0;
    repriced.candidate.total_value = 100.0;

    let report = loader.load_facts(vec![repriced]).await.expect("reload");
    let stored = FactRepository::new(&test.db).all().await?;

    assert_eq!(report.summary.total(), 0);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(
        report.rejected[0].reasons,
        vec![QuarantineReason::ImmutableFactRewrite {
            fields: vec!["price".to_string(), "total_value".to_string()],
        }]
    );
    assert!(report.rejected[0].has_reason(ReasonCategory::ValidationFailure));
    assert_eq!(stored[0].price, 100.0);

    Ok(())
}

/// Tests a status change with no accompanying backfill.
#[tokio::test]
async fn bare_status_change_is_rejected() -> Result<(), TestError> {
    let (test, fact) = fact_fixture().await?;
    let loader = coordinator(&test);
    loader.load_facts(vec![fact.clone()]).await.expect("first load");

    let mut canceled = fact;
    canceled.candidate.order_status = "canceled".to_string();

    let report = loader.load_facts(vec![canceled]).await.expect("reload");

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(
        report.rejected[0].reasons,
        vec![QuarantineReason::ImmutableFactRewrite {
            fields: vec!["order_status".to_string()],
        }]
    );

    Ok(())
}

#[test]
fn epoch_clones_share_the_counter() {
    let epoch = WarehouseEpoch::new();
    let shared = epoch.clone();

    assert_eq!(shared.bump(), 1);
    assert_eq!(epoch.current(), 1);
}
