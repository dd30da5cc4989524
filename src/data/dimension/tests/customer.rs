//! Tests for CustomerRepository.
//!
//! This module verifies the gated insert, attribute overwrite, key existence
//! lookups and soft deactivation on the customer dimension.

use super::*;

fn attributes(customer_id: &str, city: &str) -> CustomerAttributes {
    CustomerAttributes {
        customer_id: customer_id.to_string(),
        unique_id: format!("U-{customer_id}"),
        name: Some("Nguyen Van A".to_string()),
        city: Some(city.to_string()),
        state: Some("SP".to_string()),
        zip_code_prefix: Some("01001".to_string()),
        region: Some("Southeast".to_string()),
        tier: Some("Gold".to_string()),
    }
}

/// Tests inserting customers whose natural key already exists.
///
/// Verifies that the conflicting row is skipped rather than failing the insert
/// and that the existing row keeps its attributes.
///
/// Expected: Ok with one row for KH1 still holding the original city
#[tokio::test]
async fn insert_missing_skips_existing_natural_keys() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DimCustomer)
        .build()
        .await?;
    let repo = CustomerRepository::new(&test.db);
    let now = Utc::now().naive_utc();

    repo.insert_missing(&[attributes("KH1", "sao paulo")], now)
        .await?;
    let result = repo
        .insert_missing(
            &[attributes("KH1", "campinas"), attributes("KH2", "santos")],
            now,
        )
        .await;
    assert!(result.is_ok(), "Error: {:?}", result);

    let stored = repo
        .find_by_natural_keys(&["KH1".to_string(), "KH2".to_string()])
        .await?;
    assert_eq!(stored.len(), 2);

    let kh1 = stored
        .iter()
        .find(|row| row.attributes.customer_id == "KH1")
        .expect("KH1 not found");
    assert_eq!(kh1.attributes.city.as_deref(), Some("sao paulo"));
    assert!(kh1.is_active);

    Ok(())
}

/// Tests overwriting customer attributes.
///
/// Verifies that the surrogate key and created_date survive the update while
/// attributes and updated_date change.
///
/// Expected: Ok with the new city and an updated_date at the update time
#[tokio::test]
async fn update_attributes_overwrites_in_place() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DimCustomer)
        .with_mock_customer("KH000001")
        .build()
        .await?;
    let repo = CustomerRepository::new(&test.db);
    let before = repo
        .find_by_customer_id("KH000001")
        .await?
        .expect("fixture missing");

    let later = before.updated_date + chrono::Duration::seconds(5);
    let mut attrs = attributes("KH000001", "rio de janeiro");
    attrs.unique_id = before.customer_unique_id.clone();
    repo.update_attributes(before.customer_key, &attrs, later)
        .await?;

    let after = repo
        .find_by_customer_id("KH000001")
        .await?
        .expect("customer disappeared");
    assert_eq!(after.customer_key, before.customer_key);
    assert_eq!(after.created_date, before.created_date);
    assert_eq!(after.updated_date, later);
    assert_eq!(after.customer_city.as_deref(), Some("rio de janeiro"));

    Ok(())
}

/// Tests looking up which surrogate keys exist.
///
/// Expected: Ok with only the fixture's key
#[tokio::test]
async fn existing_keys_returns_known_subset() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DimCustomer)
        .build()
        .await?;
    let customer = test.warehouse().insert_mock_customer("KH000001").await?;
    let repo = CustomerRepository::new(&test.db);

    let keys = repo
        .existing_keys(&[customer.customer_key, customer.customer_key + 100])
        .await?;

    assert_eq!(keys.len(), 1);
    assert!(keys.contains(&customer.customer_key));

    Ok(())
}

/// Tests soft deactivation.
///
/// Verifies that the first call deactivates the row and a repeated call reports
/// that no active row matched.
///
/// Expected: Ok(true) then Ok(false), row still present
#[tokio::test]
async fn deactivate_is_soft() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DimCustomer)
        .with_mock_customer("KH000001")
        .build()
        .await?;
    let repo = CustomerRepository::new(&test.db);
    let now = Utc::now().naive_utc();

    assert!(repo.deactivate("KH000001", now).await?);
    assert!(!repo.deactivate("KH000001", now).await?);

    let row = repo
        .find_by_customer_id("KH000001")
        .await?
        .expect("row was deleted");
    assert!(!row.is_active);

    Ok(())
}
