//! Concurrent runs against one warehouse.

use storehouse::{
    config::{DimensionPolicy, RetryConfig, WarehouseConfig},
    data::fact::FactRepository,
    model::{
        dimension::DimensionKind,
        raw::{RawCustomer, RawOrder, RawOrderItem},
        report::RunStatus,
    },
    service::{dimension::DimensionBuilder, load::WarehouseEpoch, pipeline::BatchPipeline},
    source::SourceBatch,
};
use storehouse_test_utils::prelude::*;

use super::*;

fn customer(id: &str, unique_id: &str) -> RawCustomer {
    RawCustomer {
        customer_id: id.to_string(),
        customer_unique_id: Some(unique_id.to_string()),
        customer_city: Some("sao paulo".to_string()),
        customer_state: Some("SP".to_string()),
        ..Default::default()
    }
}

fn line(order_id: &str, customer_id: &str, product_id: &str) -> (RawOrder, RawOrderItem) {
    let purchased = NaiveDate::from_ymd_opt(2022, 2, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();

    (
        RawOrder {
            order_id: order_id.to_string(),
            customer_id: customer_id.to_string(),
            order_status: "approved".to_string(),
            order_purchase_timestamp: purchased,
            order_approved_at: None,
            order_delivered_carrier_date: None,
            order_delivered_customer_date: None,
            order_estimated_delivery_date: None,
        },
        RawOrderItem {
            order_id: order_id.to_string(),
            order_item_id: 1,
            product_id: product_id.to_string(),
            seller_id: "NB1".to_string(),
            price: 30.0,
            freight_value: 2.0,
        },
    )
}

fn batch(customers: Vec<RawCustomer>, lines: Vec<(RawOrder, RawOrderItem)>) -> SourceBatch {
    let (orders, order_items) = lines.into_iter().unzip();
    SourceBatch {
        customers,
        orders,
        order_items,
        ..Default::default()
    }
}

/// Tests two overlapping batches run concurrently under the implicit policy.
///
/// Runs against a pooled file database so both runs' transactions interleave.
///
/// Expected: one row per natural key, the full customer record wins over the
/// placeholder, every line loaded exactly once
#[tokio::test]
async fn overlapping_runs_agree_on_keys() -> Result<(), TestError> {
    let dir = tempfile::tempdir().expect("tempdir");
    let test = TestBuilder::new()
        .with_database_file(dir.path().join("warehouse.db"))
        .with_warehouse_tables()
        .build()
        .await?;
    // contended transactions are rolled back and replayed
    let config = WarehouseConfig {
        load_retry: RetryConfig {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(5),
        },
        ..config(DimensionPolicy::Implicit)
    };
    let epoch = WarehouseEpoch::new();
    let first = BatchPipeline::new(&test.db, &config, epoch.clone());
    let second = BatchPipeline::new(&test.db, &config, epoch.clone());

    let a = batch(
        vec![customer("KH1", "U1"), customer("KH2", "U2")],
        vec![line("DH1", "KH1", "SP1"), line("DH2", "KH2", "SP2")],
    );
    // KH1 is only referenced here, so this run may create it as a placeholder
    let b = batch(
        vec![customer("KH3", "U3")],
        vec![line("DH3", "KH1", "SP1"), line("DH4", "KH3", "SP3")],
    );

    let (report_a, report_b) = tokio::join!(first.run(&a), second.run(&b));

    assert_eq!(report_a.status, RunStatus::Completed);
    assert_eq!(report_b.status, RunStatus::Completed);
    assert_eq!(report_a.rows_loaded + report_b.rows_loaded, 4);

    let dimensions = DimensionBuilder::new(&test.db);
    assert_eq!(dimensions.count(DimensionKind::Customer).await.expect("count"), 3);
    assert_eq!(dimensions.count(DimensionKind::Product).await.expect("count"), 3);
    assert_eq!(dimensions.count(DimensionKind::Seller).await.expect("count"), 1);

    let kh1 = dimensions
        .find_customer("KH1")
        .await
        .expect("find")
        .expect("KH1 missing");
    assert_eq!(kh1.attributes.unique_id, "U1");
    let facts = FactRepository::new(&test.db).all().await?;
    assert_eq!(facts.len(), 4);
    assert_eq!(facts[0].customer_key, kh1.surrogate_key);
    assert_eq!(facts[2].customer_key, kh1.surrogate_key);
    assert!(epoch.current() > 0);

    Ok(())
}
