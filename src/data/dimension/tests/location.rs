//! Tests for LocationRepository.

use super::*;

/// Tests that locations are keyed by their normalized address triple.
///
/// Verifies that two spellings of the same address resolve to one row.
///
/// Expected: Ok with a single stored location
#[tokio::test]
async fn normalized_addresses_share_one_row() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DimLocation)
        .build()
        .await?;
    let repo = LocationRepository::new(&test.db);
    let now = Utc::now().naive_utc();

    let first = LocationAttributes::new(Some("01001"), Some("Sao Paulo"), Some("sp"));
    let second = LocationAttributes::new(Some(" 01001 "), Some("SAO PAULO"), Some("SP"));
    assert_eq!(first.location_id, second.location_id);

    repo.insert_missing(&[first.clone()], now).await?;
    repo.insert_missing(&[second], now).await?;

    let stored = repo
        .find_by_natural_keys(&[first.location_id.clone()])
        .await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].attributes, first);

    Ok(())
}
