//! Runs over extract directories written to a temporary folder.

use storehouse::{
    config::DimensionPolicy,
    data::{fact::FactRepository, quarantine::QuarantineRepository},
    model::{
        dimension::DimensionKind,
        quarantine::QuarantineReason,
        report::RunStatus,
    },
    service::{load::WarehouseEpoch, pipeline::BatchPipeline},
    source::SourceBatch,
};
use storehouse_test_utils::prelude::*;

use super::*;

/// Tests a lookup-only run over a full set of extracts.
///
/// Expected: the three resolvable lines load with derived metrics and summed
/// installments; the line of the unknown customer is quarantined
#[tokio::test]
async fn loads_extract_directory() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let dir = tempfile::tempdir().expect("tempdir");
    write_extracts(dir.path(), &all_extracts());
    let config = config(DimensionPolicy::LookupOnly);

    let batch = SourceBatch::from_dir(dir.path()).expect("read extracts");
    let report = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new())
        .run(&batch)
        .await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.calendar_days, 90);
    assert_eq!(report.rows_processed, 4);
    assert_eq!(report.rows_loaded, 3);
    assert_eq!(report.quarantined.len(), 1);
    assert_eq!(report.quarantined[0].order_id, "DH3");
    assert!(report.quarantined[0]
        .reasons
        .contains(&QuarantineReason::UnresolvedDimensionReference {
            kind: DimensionKind::Customer,
            natural_key: "KH404".to_string(),
        }));

    let facts = FactRepository::new(&test.db).all().await?;
    assert_eq!(facts.len(), 3);

    let delivered = &facts[0];
    assert_eq!((delivered.order_id.as_str(), delivered.order_item_id), ("DH1", 1));
    assert_eq!(delivered.payment_installments, 5);
    assert_eq!(delivered.total_value, 112.5);
    assert_eq!(delivered.order_date_key, 20220110);
    assert_eq!(delivered.delivery_date_key, Some(20220114));
    assert_eq!(delivered.processing_time_hours, Some(2));
    assert_eq!(delivered.delivery_delay_days, Some(-6));
    assert_eq!(delivered.is_delivered_ontime, Some(true));
    assert_eq!(delivered.is_fast_delivery, Some(true));

    let shipped = &facts[2];
    assert_eq!(shipped.order_id, "DH2");
    assert_eq!(shipped.payment_installments, 1);
    assert_eq!(shipped.delivery_date_key, None);
    assert_eq!(shipped.delivery_delay_days, None);

    Ok(())
}

/// Tests re-running an extract after a delivery was confirmed.
///
/// Expected: the delivery fields of the shipped line are backfilled, nothing else changes
#[tokio::test]
async fn rerun_backfills_confirmed_delivery() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let dir = tempfile::tempdir().expect("tempdir");
    write_extracts(dir.path(), &all_extracts());
    let config = config(DimensionPolicy::LookupOnly);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());

    let first = SourceBatch::from_dir(dir.path()).expect("read extracts");
    pipeline.run(&first).await;

    let confirmed = ORDERS.replace(
        "DH2,KH2,shipped,2022-02-01 12:00:00,2022-02-01 13:00:00,,,2022-02-10 00:00:00",
        "DH2,KH2,delivered,2022-02-01 12:00:00,2022-02-01 13:00:00,2022-02-02 09:00:00,2022-02-12 10:00:00,2022-02-10 00:00:00",
    );
    write_extracts(dir.path(), &[("orders.csv", confirmed.as_str())]);
    let second = SourceBatch::from_dir(dir.path()).expect("read extracts");
    let report = pipeline.run(&second).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.facts.inserted, 0);
    assert_eq!(report.facts.updated, 1);
    assert_eq!(report.facts.unchanged, 2);

    let facts = FactRepository::new(&test.db).all().await?;
    let backfilled = &facts[2];
    assert_eq!(backfilled.order_status, "delivered");
    assert_eq!(backfilled.delivery_date_key, Some(20220212));
    assert_eq!(backfilled.delivery_delay_days, Some(2));
    assert_eq!(backfilled.is_delivered_ontime, Some(false));
    assert_eq!(backfilled.price, 100.0);

    Ok(())
}

/// Tests a directory that holds only some of the extracts.
///
/// Expected: missing files read as empty and the run completes without facts
#[tokio::test]
async fn partial_directory_completes() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let dir = tempfile::tempdir().expect("tempdir");
    write_extracts(dir.path(), &[("customers.csv", CUSTOMERS)]);
    let config = config(DimensionPolicy::Implicit);

    let batch = SourceBatch::from_dir(dir.path()).expect("read extracts");
    let report = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new())
        .run(&batch)
        .await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.rows_processed, 0);
    // two customers and their two locations
    assert_eq!(report.dimensions.inserted, 4);
    assert_eq!(FactRepository::new(&test.db).count().await?, 0);

    Ok(())
}

/// Tests an extract holding an order line with an unparseable price.
///
/// Expected: the run completes, the other lines load and the bad record is
/// quarantined and persisted with the run
#[tokio::test]
async fn malformed_line_is_quarantined() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let dir = tempfile::tempdir().expect("tempdir");
    write_extracts(dir.path(), &all_extracts());
    let items = format!("{}DH2,2,SP2,NB1,abc,1.0\n", ORDER_ITEMS);
    write_extracts(dir.path(), &[("order_items.csv", items.as_str())]);
    let config = config(DimensionPolicy::LookupOnly);

    let batch = SourceBatch::from_dir(dir.path()).expect("read extracts");
    let report = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new())
        .run(&batch)
        .await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.rows_processed, 4);
    assert_eq!(report.rows_loaded, 3);
    assert_eq!(report.quarantined.len(), 2);

    let malformed = report
        .quarantined
        .iter()
        .find(|entry| entry.order_id == "DH2")
        .expect("malformed line not quarantined");
    assert_eq!(malformed.order_item_id, 2);
    assert!(matches!(
        &malformed.reasons[..],
        [QuarantineReason::MalformedRecord { file, line: 6, .. }] if file == "order_items.csv"
    ));

    let run_id = report.run_id.expect("run row missing");
    let stored = QuarantineRepository::new(&test.db).find_by_run(run_id).await?;
    assert_eq!(stored.len(), 2);
    assert_eq!(FactRepository::new(&test.db).count().await?, 3);

    Ok(())
}
