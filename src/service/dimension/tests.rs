//! Tests for DimensionBuilder.
//!
//! This module verifies the type-1 upsert: creation on first encounter,
//! in-place updates, idempotent re-submission, identity conflicts, placeholder
//! claiming, lookup-only resolution and concurrent discovery of one key.

use storehouse_test_utils::prelude::*;

use super::*;
use crate::model::dimension::{LocationAttributes, ProductAttributes};

fn customer(customer_id: &str, unique_id: &str, city: &str) -> DimensionAttributes {
    DimensionAttributes::Customer(CustomerAttributes {
        customer_id: customer_id.to_string(),
        unique_id: unique_id.to_string(),
        name: Some("Tran Thi B".to_string()),
        city: Some(city.to_string()),
        state: Some("SP".to_string()),
        zip_code_prefix: Some("01001".to_string()),
        region: Some("Southeast".to_string()),
        tier: Some("Silver".to_string()),
    })
}

async fn warehouse() -> Result<TestContext, TestError> {
    TestBuilder::new().with_warehouse_tables().build().await
}

/// Tests resolving an unknown customer.
///
/// Verifies that a new active row is created and its surrogate key returned.
///
/// Expected: Ok with a key that lookup() also returns
#[tokio::test]
async fn creates_unknown_rows() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    let key = builder
        .resolve_or_create(customer("KH1", "U1", "sao paulo"))
        .await
        .expect("resolution failed");

    let looked_up = builder
        .lookup(DimensionKind::Customer, "KH1")
        .await
        .expect("lookup failed");
    assert_eq!(looked_up, Some(key));

    Ok(())
}

/// Tests re-submitting identical rows.
///
/// Verifies that the second upsert reports every row unchanged and leaves
/// updated_date untouched.
///
/// Expected: Ok with 2 inserted, then 2 unchanged and identical timestamps
#[tokio::test]
async fn resubmission_is_idempotent() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);
    let rows = vec![
        customer("KH1", "U1", "sao paulo"),
        customer("KH2", "U2", "santos"),
    ];

    let first = builder.upsert_many(rows.clone()).await.expect("first load");
    let before = builder.find_customer("KH1").await.expect("find").unwrap();
    let second = builder.upsert_many(rows).await.expect("second load");
    let after = builder.find_customer("KH1").await.expect("find").unwrap();

    assert_eq!(first.summary.inserted, 2);
    assert_eq!(second.summary.unchanged, 2);
    assert!(!second.summary.wrote());
    assert_eq!(first.keys, second.keys);
    assert_eq!(before.updated_date, after.updated_date);

    Ok(())
}

/// Tests changing descriptive attributes.
///
/// Verifies that the surrogate key is kept and attributes are overwritten.
///
/// Expected: Ok with 1 updated and the new city stored
#[tokio::test]
async fn updates_attributes_in_place() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    let key = builder
        .resolve_or_create(customer("KH1", "U1", "sao paulo"))
        .await
        .expect("create");
    let upsert = builder
        .upsert_many(vec![customer("KH1", "U1", "campinas")])
        .await
        .expect("update");

    assert_eq!(upsert.summary.updated, 1);
    assert_eq!(upsert.key(DimensionKind::Customer, "KH1"), Some(key));

    let stored = builder.find_customer("KH1").await.expect("find").unwrap();
    assert_eq!(stored.attributes.city.as_deref(), Some("campinas"));
    assert!(stored.updated_date >= stored.created_date);

    Ok(())
}

/// Tests a known natural key arriving with a different identity.
///
/// Expected: Err(DuplicateNaturalKeyConflict)
#[tokio::test]
async fn identity_mismatch_is_a_conflict() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    builder
        .resolve_or_create(customer("KH1", "U1", "sao paulo"))
        .await
        .expect("create");
    let result = builder
        .resolve_or_create(customer("KH1", "U-other", "sao paulo"))
        .await;

    assert!(matches!(
        result,
        Err(Error::WarehouseError(
            WarehouseError::DuplicateNaturalKeyConflict { .. }
        ))
    ));

    Ok(())
}

/// Tests in-batch duplicates that disagree on identity.
///
/// Expected: Err(DuplicateNaturalKeyConflict) and nothing written
#[tokio::test]
async fn in_batch_identity_conflict_is_rejected() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    let result = builder
        .upsert_many(vec![
            customer("KH1", "U1", "sao paulo"),
            customer("KH1", "U2", "sao paulo"),
        ])
        .await;
    assert!(result.is_err());

    let stored = builder.find_customer("KH1").await.expect("find");
    assert!(stored.is_none());

    Ok(())
}

/// Tests a customer record claiming a placeholder created from an order.
///
/// Expected: Ok with the same surrogate key and the record's attributes stored
#[tokio::test]
async fn full_record_claims_placeholder() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    let placeholder = builder
        .resolve_or_create(DimensionAttributes::Customer(
            CustomerAttributes::placeholder("KH9"),
        ))
        .await
        .expect("placeholder");
    let claimed = builder
        .resolve_or_create(customer("KH9", "U9", "recife"))
        .await
        .expect("claim");
    let again = builder
        .resolve_or_create(DimensionAttributes::Customer(
            CustomerAttributes::placeholder("KH9"),
        ))
        .await
        .expect("placeholder after claim");

    assert_eq!(placeholder, claimed);
    assert_eq!(claimed, again);

    let stored = builder.find_customer("KH9").await.expect("find").unwrap();
    assert_eq!(stored.attributes.unique_id, "U9");
    assert_eq!(stored.attributes.city.as_deref(), Some("recife"));

    Ok(())
}

/// Tests a customer first stored without a unique id.
///
/// Verifies that a later record stating the unique id updates the row in place,
/// and that a record omitting it again keeps the stored identity.
///
/// Expected: Ok with the same surrogate key and unique id "U1" retained
#[tokio::test]
async fn unknown_identity_is_filled_in_place() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    let first = builder
        .resolve_or_create(customer("KH1", "", "sao paulo"))
        .await
        .expect("create without identity");
    let upsert = builder
        .upsert_many(vec![customer("KH1", "U1", "campinas")])
        .await
        .expect("identity arrives");

    assert_eq!(upsert.summary.updated, 1);
    assert_eq!(upsert.key(DimensionKind::Customer, "KH1"), Some(first));

    let upsert = builder
        .upsert_many(vec![customer("KH1", "", "campinas")])
        .await
        .expect("identity omitted again");
    assert_eq!(upsert.summary.unchanged, 1);

    let stored = builder.find_customer("KH1").await.expect("find").unwrap();
    assert_eq!(stored.surrogate_key, first);
    assert_eq!(stored.attributes.unique_id, "U1");
    assert_eq!(stored.attributes.city.as_deref(), Some("campinas"));

    Ok(())
}

/// Tests lookup-only resolution of unknown and deactivated rows.
///
/// Expected: None for an unknown key and for a deactivated key; no rows created
#[tokio::test]
async fn lookup_never_creates_and_skips_inactive() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    assert_eq!(
        builder
            .lookup(DimensionKind::Product, "SP404")
            .await
            .expect("lookup"),
        None
    );

    builder
        .resolve_or_create(DimensionAttributes::Product(ProductAttributes::placeholder(
            "SP1",
        )))
        .await
        .expect("create");
    assert!(builder
        .deactivate(DimensionKind::Product, "SP1")
        .await
        .expect("deactivate"));

    let found = builder
        .lookup_many(DimensionKind::Product, &["SP1".to_string(), "SP404".to_string()])
        .await
        .expect("lookup");
    assert!(found.is_empty());

    Ok(())
}

/// Tests two concurrent resolutions of the same new customer.
///
/// Expected: Ok for both with one surrogate key and one stored row
#[tokio::test]
async fn concurrent_resolution_converges() -> Result<(), TestError> {
    use sea_orm::{EntityTrait, PaginatorTrait};

    let test = warehouse().await?;
    let first = DimensionBuilder::new(&test.db);
    let second = DimensionBuilder::new(&test.db);

    let (a, b) = tokio::join!(
        first.resolve_or_create(customer("KH7", "U7", "natal")),
        second.resolve_or_create(customer("KH7", "U7", "natal")),
    );

    let a = a.expect("first resolution");
    let b = b.expect("second resolution");
    assert_eq!(a, b);

    let rows = entity::prelude::DimCustomer::find().count(&test.db).await?;
    assert_eq!(rows, 1);

    Ok(())
}

/// Tests existence checks across dimensions.
///
/// Expected: Ok with only the stored location key reported
#[tokio::test]
async fn existing_keys_by_kind() -> Result<(), TestError> {
    let test = warehouse().await?;
    let builder = DimensionBuilder::new(&test.db);

    let key = builder
        .resolve_or_create(DimensionAttributes::Location(LocationAttributes::new(
            Some("50000"),
            Some("Recife"),
            Some("PE"),
        )))
        .await
        .expect("create");

    let existing = builder
        .existing_keys(DimensionKind::Location, &[key, key + 1])
        .await
        .expect("existing");
    assert_eq!(existing, HashSet::from([key]));

    Ok(())
}
