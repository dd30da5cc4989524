//! Warehouse-wide invariants after implicit-policy runs.

use std::collections::HashSet;

use sea_orm::EntityTrait;
use storehouse::{
    config::DimensionPolicy,
    data::fact::FactRepository,
    model::dimension::DimensionKind,
    service::{
        dimension::DimensionBuilder, load::WarehouseEpoch, pipeline::BatchPipeline,
        quality::QualityService,
    },
    source::SourceBatch,
};
use storehouse_test_utils::prelude::*;

use super::*;

async fn keys<E: EntityTrait>(
    db: &sea_orm::DatabaseConnection,
    key: impl Fn(&E::Model) -> i32,
) -> HashSet<i32> {
    E::find()
        .all(db)
        .await
        .expect("read keys")
        .iter()
        .map(key)
        .collect()
}

/// Tests referential integrity and amount consistency of every loaded fact.
///
/// Expected: every key resolves, totals equal price plus freight, quality scores 100
#[tokio::test]
async fn facts_reference_existing_rows() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let dir = tempfile::tempdir().expect("tempdir");
    write_extracts(dir.path(), &all_extracts());
    let config = config(DimensionPolicy::Implicit);

    let batch = SourceBatch::from_dir(dir.path()).expect("read extracts");
    let report = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new())
        .run(&batch)
        .await;
    assert_eq!(report.rows_loaded, 4);
    assert!(report.quarantined.is_empty());

    let customers = keys::<entity::prelude::DimCustomer>(&test.db, |m| m.customer_key).await;
    let products = keys::<entity::prelude::DimProduct>(&test.db, |m| m.product_key).await;
    let sellers = keys::<entity::prelude::DimSeller>(&test.db, |m| m.seller_key).await;
    let locations = keys::<entity::prelude::DimLocation>(&test.db, |m| m.location_key).await;
    let dates = keys::<entity::prelude::DimDate>(&test.db, |m| m.date_key).await;

    for fact in FactRepository::new(&test.db).all().await? {
        assert!(customers.contains(&fact.customer_key));
        assert!(products.contains(&fact.product_key));
        assert!(sellers.contains(&fact.seller_key));
        assert!(locations.contains(&fact.location_key));
        assert!(dates.contains(&fact.order_date_key));
        if let Some(delivery) = fact.delivery_date_key {
            assert!(dates.contains(&delivery));
        }
        assert!((fact.total_value - (fact.price + fact.freight_value)).abs() < 1e-9);
    }

    let quality = QualityService::new(&test.db)
        .run_checks()
        .await
        .expect("quality checks");
    assert_eq!(quality.total_value_violations, 0);
    assert_eq!(quality.record_counts.facts, 4);

    Ok(())
}

/// Tests that repeated runs never duplicate dimension rows or change surrogate keys.
///
/// Expected: identical key maps after the second run
#[tokio::test]
async fn surrogate_keys_are_stable_across_runs() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let dir = tempfile::tempdir().expect("tempdir");
    write_extracts(dir.path(), &all_extracts());
    let config = config(DimensionPolicy::Implicit);
    let pipeline = BatchPipeline::new(&test.db, &config, WarehouseEpoch::new());
    let batch = SourceBatch::from_dir(dir.path()).expect("read extracts");
    let dimensions = DimensionBuilder::new(&test.db);

    pipeline.run(&batch).await;
    let mut before = Vec::new();
    for kind in [
        DimensionKind::Customer,
        DimensionKind::Product,
        DimensionKind::Seller,
        DimensionKind::Location,
    ] {
        before.push(dimensions.natural_keys(kind).await.expect("natural keys"));
    }

    let report = pipeline.run(&batch).await;
    let mut after = Vec::new();
    for kind in [
        DimensionKind::Customer,
        DimensionKind::Product,
        DimensionKind::Seller,
        DimensionKind::Location,
    ] {
        after.push(dimensions.natural_keys(kind).await.expect("natural keys"));
    }

    assert_eq!(before, after);
    assert_eq!(report.facts.inserted, 0);
    assert_eq!(FactRepository::new(&test.db).count().await?, 4);

    // KH404 only appears on an order and stays a placeholder
    let placeholder = dimensions
        .find_customer("KH404")
        .await
        .expect("find")
        .expect("KH404 missing");
    assert_eq!(placeholder.attributes.unique_id, "");

    Ok(())
}
