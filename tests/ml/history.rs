//! Versioned prediction history read from JSON-lines artifacts.

use std::fs;

use chrono::NaiveDate;
use storehouse::{
    model::ml::ChurnPrediction,
    service::{analytics::AnalyticsView, load::WarehouseEpoch, ml::MlResultIntegrator},
    source::jsonl,
};
use storehouse_test_utils::prelude::*;

fn artifact(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write artifact");
    path
}

/// Tests ingesting two model versions from artifacts.
///
/// Expected: every version kept in order, the unknown customer rejected, and the
/// analytics projection showing the newest probability once the epoch moved
#[tokio::test]
async fn newest_version_reaches_analytics() -> Result<(), TestError> {
    let test = TestBuilder::new().with_warehouse_tables().build().await?;
    let purchased = NaiveDate::from_ymd_opt(2022, 1, 5)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    test.warehouse()
        .insert_mock_fact("DH1", 1, "KH1", "SP1", "NB1", purchased)
        .await?;

    let dir = tempfile::tempdir().expect("tempdir");
    let v1 = artifact(
        dir.path(),
        "churn_v1.jsonl",
        "{\"customer_id\":\"KH1\",\"churn_probability\":0.2}\n\
         {\"customer_id\":\"KH404\",\"churn_probability\":0.9}\n",
    );
    let v2 = artifact(
        dir.path(),
        "churn_v2.jsonl",
        "\n{\"customer_id\":\"KH1\",\"churn_probability\":0.75,\"predicted_date\":\"2022-02-01\"}\n",
    );

    let epoch = WarehouseEpoch::new();
    let integrator = MlResultIntegrator::new(&test.db).with_epoch(epoch.clone());
    let view = AnalyticsView::new(&test.db, epoch.clone());

    let first: Vec<ChurnPrediction> = jsonl::read_lines(&v1).expect("read v1");
    let report = integrator
        .ingest_churn_batch(&first, "churn-v1")
        .await
        .expect("ingest v1");
    assert_eq!(report.ingested, 1);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].reference, "KH404");

    let before = view.customer_summaries().await.expect("summaries");
    assert_eq!(before[0].latest_churn_probability, Some(0.2));

    let second: Vec<ChurnPrediction> = jsonl::read_lines(&v2).expect("read v2");
    integrator
        .ingest_churn_batch(&second, "churn-v2")
        .await
        .expect("ingest v2");

    let history = integrator.history_churn("KH1").await.expect("history");
    let versions: Vec<&str> = history.iter().map(|row| row.model_version.as_str()).collect();
    assert_eq!(versions, ["churn-v1", "churn-v2"]);

    let after = view.customer_summaries().await.expect("summaries");
    assert_eq!(after[0].customer_id, "KH1");
    assert_eq!(after[0].latest_churn_probability, Some(0.75));
    assert_eq!(epoch.current(), 2);

    Ok(())
}
