//! Tests for BatchPipeline.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use storehouse_test_utils::prelude::*;

use super::*;
use crate::{
    config::{CalendarConfig, DimensionPolicy, RetryConfig},
    data::fact::FactRepository,
    model::{
        calendar::SeasonTable,
        dimension::DimensionKind,
        quarantine::ReasonCategory,
        raw::{RawCustomer, RawPayment, RawProduct, RawSeller},
    },
    service::dimension::DimensionBuilder,
};

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn config(policy: DimensionPolicy) -> WarehouseConfig {
    WarehouseConfig {
        calendar: CalendarConfig {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2022, 1, 31).unwrap(),
            seasons: SeasonTable::Northern,
        },
        dimension_policy: policy,
        load_retry: RetryConfig {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
        },
    }
}

fn customer(id: &str, unique_id: &str) -> RawCustomer {
    RawCustomer {
        customer_id: id.to_string(),
        customer_unique_id: Some(unique_id.to_string()),
        customer_city: Some("Sao Paulo".to_string()),
        customer_state: Some("SP".to_string()),
        customer_zip_code_prefix: Some("01001".to_string()),
        ..Default::default()
    }
}

fn order(order_id: &str, customer_id: &str, purchased: &str) -> RawOrder {
    RawOrder {
        order_id: order_id.to_string(),
        customer_id: customer_id.to_string(),
        order_status: "delivered".to_string(),
        order_purchase_timestamp: ts(purchased),
        order_approved_at: None,
        order_delivered_carrier_date: None,
        order_delivered_customer_date: None,
        order_estimated_delivery_date: None,
    }
}

fn item(order_id: &str, price: f64) -> RawOrderItem {
    RawOrderItem {
        order_id: order_id.to_string(),
        order_item_id: 1,
        product_id: "SP1".to_string(),
        seller_id: "NB1".to_string(),
        price,
        freight_value: 5.0,
    }
}

/// A batch with two good lines and one line of each rejection kind.
fn batch() -> SourceBatch {
    SourceBatch {
        customers: vec![customer("KH1", "U1"), customer("KH2", "U2")],
        sellers: vec![RawSeller {
            seller_id: "NB1".to_string(),
            seller_city: Some("Curitiba".to_string()),
            seller_state: Some("PR".to_string()),
            ..Default::default()
        }],
        products: vec![RawProduct {
            product_id: "SP1".to_string(),
            product_category_name: Some("electronics".to_string()),
            ..Default::default()
        }],
        orders: vec![
            order("DH1", "KH1", "2022-01-02 10:00:00"),
            order("DH2", "KH2", "2022-01-03 10:00:00"),
            order("DH3", "KH404", "2022-01-04 10:00:00"),
            order("DH4", "KH1", "2023-06-01 10:00:00"),
        ],
        order_items: vec![
            item("DH1", 50.0),
            item("DH2", 20.0),
            item("DH3", 10.0),
            item("DH4", 10.0),
            item("DH9", 10.0),
        ],
        payments: vec![RawPayment {
            order_id: "DH1".to_string(),
            payment_sequential: Some(1),
            payment_type: Some("credit_card".to_string()),
            payment_installments: 3,
            payment_value: Some(55.0),
        }],
        malformed: Vec::new(),
    }
}

/// Tests a lookup-only run over a mixed batch.
///
/// Expected: good lines loaded with consistent totals, the unknown customer,
/// out-of-calendar and orphan lines quarantined and persisted with the run
#[tokio::test]
async fn run_loads_and_quarantines() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let config = config(DimensionPolicy::LookupOnly);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    let report = pipeline.run(&batch()).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.abort_cause, None);
    assert_eq!(report.rows_processed, 5);
    assert_eq!(report.rows_loaded, 2);
    assert_eq!(report.calendar_days, 31);
    assert_eq!(report.quarantined.len(), 3);

    let unknown = report
        .quarantined
        .iter()
        .find(|entry| entry.order_id == "DH3")
        .expect("DH3 not quarantined");
    assert!(unknown.reasons.contains(&QuarantineReason::UnresolvedDimensionReference {
        kind: DimensionKind::Customer,
        natural_key: "KH404".to_string(),
    }));
    let breakdown = report.quarantine_breakdown();
    assert_eq!(breakdown.get("missing_date_dimension_row"), Some(&1));
    assert_eq!(breakdown.get("validation_failure"), Some(&1));

    let facts = FactRepository::new(&test.db).all().await?;
    assert_eq!(facts.len(), 2);
    assert!(facts
        .iter()
        .all(|f| (f.total_value - (f.price + f.freight_value)).abs() < 1e-9));
    assert_eq!(facts[0].payment_installments, 3);

    let run_id = report.run_id.expect("run row missing");
    let run = RunRepository::new(&test.db)
        .find_by_id(run_id)
        .await?
        .expect("run row missing");
    assert_eq!(run.status, "completed");
    assert_eq!(run.rows_quarantined, 3);
    assert_eq!(
        QuarantineRepository::new(&test.db).find_by_run(run_id).await?.len(),
        3
    );

    Ok(())
}

/// Tests running the same batch twice.
///
/// Expected: no new rows and untouched updated_date on the second run
#[tokio::test]
async fn rerun_is_idempotent() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let config = config(DimensionPolicy::LookupOnly);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    pipeline.run(&batch()).await;
    let facts_before = FactRepository::new(&test.db).all().await?;
    let customer_before = DimensionBuilder::new(&test.db)
        .find_customer("KH1")
        .await
        .expect("find")
        .expect("KH1 missing");

    let second = pipeline.run(&batch()).await;
    let facts_after = FactRepository::new(&test.db).all().await?;
    let customer_after = DimensionBuilder::new(&test.db)
        .find_customer("KH1")
        .await
        .expect("find")
        .expect("KH1 missing");

    assert_eq!(second.status, RunStatus::Completed);
    assert_eq!(second.facts.inserted, 0);
    assert_eq!(second.facts.unchanged, 2);
    assert!(!second.dimensions.wrote());
    assert_eq!(facts_before, facts_after);
    assert_eq!(customer_before, customer_after);

    Ok(())
}

/// Tests the implicit policy.
///
/// Expected: the unknown customer is created as a placeholder and its line loaded
#[tokio::test]
async fn implicit_policy_creates_missing_customers() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let config = config(DimensionPolicy::Implicit);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    let report = pipeline.run(&batch()).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.rows_loaded, 3);
    assert!(!report
        .quarantined
        .iter()
        .any(|entry| entry.has_reason(ReasonCategory::UnresolvedDimensionReference)));
    let placeholder = DimensionBuilder::new(&test.db)
        .find_customer("KH404")
        .await
        .expect("find")
        .expect("KH404 not created");
    assert_eq!(placeholder.attributes.unique_id, "");

    Ok(())
}

/// Tests a batch that changes a known customer's identity.
///
/// Expected: the run aborts, the cause is recorded, no facts are loaded
#[tokio::test]
async fn identity_conflict_aborts_the_run() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let config = config(DimensionPolicy::LookupOnly);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    let mut first = batch();
    first.order_items.clear();
    pipeline.run(&first).await;

    let mut conflicting = batch();
    conflicting.customers[0] = customer("KH1", "U9");
    let report = pipeline.run(&conflicting).await;

    assert_eq!(report.status, RunStatus::Aborted);
    assert!(report
        .abort_cause
        .as_deref()
        .is_some_and(|cause| cause.contains("KH1")));
    assert_eq!(FactRepository::new(&test.db).count().await?, 0);

    let run = RunRepository::new(&test.db)
        .find_by_id(report.run_id.expect("run row missing"))
        .await?
        .expect("run row missing");
    assert_eq!(run.status, "aborted");
    assert!(run.abort_cause.is_some());

    Ok(())
}

/// Tests a customer whose first record carries no unique id.
///
/// Expected: the later record with the unique id updates the row in place and
/// the run completes
#[tokio::test]
async fn late_unique_id_updates_in_place() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let config = config(DimensionPolicy::LookupOnly);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    let mut first = batch();
    first.customers[0].customer_unique_id = None;
    first.order_items.clear();
    let report = pipeline.run(&first).await;
    assert_eq!(report.status, RunStatus::Completed);

    let before = DimensionBuilder::new(&test.db)
        .find_customer("KH1")
        .await
        .expect("find")
        .expect("KH1 missing");
    assert_eq!(before.attributes.unique_id, "");

    let report = pipeline.run(&batch()).await;
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.rows_loaded, 2);

    let after = DimensionBuilder::new(&test.db)
        .find_customer("KH1")
        .await
        .expect("find")
        .expect("KH1 missing");
    assert_eq!(after.surrogate_key, before.surrogate_key);
    assert_eq!(after.attributes.unique_id, "U1");

    Ok(())
}

/// Tests an implicit run referencing a deactivated product.
///
/// Expected: lines on the product are quarantined and the row stays inactive
#[tokio::test]
async fn deactivated_product_is_not_revived() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let config = config(DimensionPolicy::Implicit);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    let mut first = batch();
    first.order_items.clear();
    pipeline.run(&first).await;

    let dimensions = DimensionBuilder::new(&test.db);
    assert!(dimensions
        .deactivate(DimensionKind::Product, "SP1")
        .await
        .expect("deactivate"));

    let report = pipeline.run(&batch()).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.rows_loaded, 0);
    let line = report
        .quarantined
        .iter()
        .find(|entry| entry.order_id == "DH1")
        .expect("DH1 not quarantined");
    assert!(line.reasons.contains(&QuarantineReason::UnresolvedDimensionReference {
        kind: DimensionKind::Product,
        natural_key: "SP1".to_string(),
    }));
    assert_eq!(FactRepository::new(&test.db).count().await?, 0);

    let (_, active) = dimensions
        .find_key(DimensionKind::Product, "SP1")
        .await
        .expect("find")
        .expect("SP1 missing");
    assert!(!active);

    Ok(())
}

/// Tests a run against a database without the warehouse schema.
///
/// Expected: aborted before a run row could be opened
#[tokio::test]
async fn missing_schema_aborts_without_run_row() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let config = config(DimensionPolicy::Implicit);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    let report = pipeline.run(&batch()).await;

    assert_eq!(report.status, RunStatus::Aborted);
    assert_eq!(report.run_id, None);
    assert!(report.abort_cause.is_some());

    Ok(())
}
