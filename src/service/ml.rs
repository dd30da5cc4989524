//! Ingestion of externally produced model predictions.
//!
//! Predictions reference customers and products by natural key. They are
//! resolved in lookup-only mode: an unknown or inactive reference rejects the
//! prediction and never creates a dimension row. Result rows are append-only;
//! the current prediction of a kind is simply the newest row. Every appended
//! row moves the warehouse epoch when one is attached.

use chrono::{NaiveDateTime, Utc};
use sea_orm::ConnectionTrait;

use crate::{
    data::ml::{
        ChurnPredictionRepository, CustomerSegmentRepository, LifetimeValueRepository,
        MarketBasketRuleRepository,
    },
    error::{ml::MlError, Error},
    model::{
        dimension::DimensionKind,
        ml::{ChurnPrediction, LifetimeValuePrediction, MarketBasketRule, SegmentPrediction},
        report::{IngestReport, RejectedPrediction},
    },
    service::{dimension::DimensionBuilder, load::WarehouseEpoch},
};

pub struct MlResultIntegrator<'a, C: ConnectionTrait> {
    db: &'a C,
    dimensions: DimensionBuilder<'a, C>,
    epoch: Option<WarehouseEpoch>,
}

impl<'a, C: ConnectionTrait> MlResultIntegrator<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self {
            db,
            dimensions: DimensionBuilder::new(db),
            epoch: None,
        }
    }

    /// Bumps `epoch` after every appended row so cached projections are rebuilt.
    pub fn with_epoch(mut self, epoch: WarehouseEpoch) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Appends a segmentation result for an active customer.
    ///
    /// # Returns
    /// - `Ok(Model)` - The appended row, stamped with the current time
    /// - `Err(Error::MlError(UnknownCustomerReference))` - No active customer with that natural key
    pub async fn ingest_segmentation(
        &self,
        prediction: &SegmentPrediction,
        model_version: &str,
    ) -> Result<entity::ml_customer_segment::Model, Error> {
        let customer_key = self.active_customer(&prediction.customer_id).await?;

        let row = CustomerSegmentRepository::new(self.db)
            .create(customer_key, prediction, model_version, now())
            .await?;
        self.appended();

        Ok(row)
    }

    /// Appends a churn prediction; the risk label is derived from the probability when absent.
    pub async fn ingest_churn(
        &self,
        prediction: &ChurnPrediction,
        model_version: &str,
    ) -> Result<entity::ml_churn_prediction::Model, Error> {
        let customer_key = self.active_customer(&prediction.customer_id).await?;

        let row = ChurnPredictionRepository::new(self.db)
            .create(customer_key, prediction, model_version, now())
            .await?;
        self.appended();

        Ok(row)
    }

    pub async fn ingest_lifetime_value(
        &self,
        prediction: &LifetimeValuePrediction,
        model_version: &str,
    ) -> Result<entity::ml_customer_lifetime_value::Model, Error> {
        let customer_key = self.active_customer(&prediction.customer_id).await?;

        let row = LifetimeValueRepository::new(self.db)
            .create(customer_key, prediction, model_version, now())
            .await?;
        self.appended();

        Ok(row)
    }

    /// Appends an association rule once every product on both sides resolves.
    ///
    /// # Returns
    /// - `Ok(Model)` - The appended rule with product sides stored as surrogate keys
    /// - `Err(Error::MlError(EmptyRuleSide))` - Either side lists no products
    /// - `Err(Error::MlError(UnknownProductReference))` - A product is unknown or inactive
    pub async fn ingest_market_basket_rule(
        &self,
        rule: &MarketBasketRule,
        model_version: &str,
    ) -> Result<entity::ml_market_basket_rule::Model, Error> {
        let antecedents = self.active_products(&rule.antecedents, "antecedent").await?;
        let consequents = self.active_products(&rule.consequents, "consequent").await?;

        let row = MarketBasketRuleRepository::new(self.db)
            .create(&antecedents, &consequents, rule, model_version, now())
            .await?;
        self.appended();

        Ok(row)
    }

    pub async fn ingest_segmentation_batch(
        &self,
        predictions: &[SegmentPrediction],
        model_version: &str,
    ) -> Result<IngestReport, Error> {
        let mut report = IngestReport::default();
        for prediction in predictions {
            let result = self.ingest_segmentation(prediction, model_version).await;
            tally(&mut report, &prediction.customer_id, result)?;
        }

        log_report("segmentation", model_version, &report);
        Ok(report)
    }

    pub async fn ingest_churn_batch(
        &self,
        predictions: &[ChurnPrediction],
        model_version: &str,
    ) -> Result<IngestReport, Error> {
        let mut report = IngestReport::default();
        for prediction in predictions {
            let result = self.ingest_churn(prediction, model_version).await;
            tally(&mut report, &prediction.customer_id, result)?;
        }

        log_report("churn", model_version, &report);
        Ok(report)
    }

    pub async fn ingest_lifetime_value_batch(
        &self,
        predictions: &[LifetimeValuePrediction],
        model_version: &str,
    ) -> Result<IngestReport, Error> {
        let mut report = IngestReport::default();
        for prediction in predictions {
            let result = self.ingest_lifetime_value(prediction, model_version).await;
            tally(&mut report, &prediction.customer_id, result)?;
        }

        log_report("lifetime value", model_version, &report);
        Ok(report)
    }

    pub async fn ingest_market_basket_rule_batch(
        &self,
        rules: &[MarketBasketRule],
        model_version: &str,
    ) -> Result<IngestReport, Error> {
        let mut report = IngestReport::default();
        for rule in rules {
            let reference = format!(
                "{} => {}",
                rule.antecedents.join(","),
                rule.consequents.join(",")
            );
            let result = self.ingest_market_basket_rule(rule, model_version).await;
            tally(&mut report, &reference, result)?;
        }

        log_report("market basket", model_version, &report);
        Ok(report)
    }

    pub async fn latest_churn(
        &self,
        customer_id: &str,
    ) -> Result<Option<entity::ml_churn_prediction::Model>, Error> {
        let customer_key = self.known_customer(customer_id).await?;

        Ok(ChurnPredictionRepository::new(self.db)
            .latest_for_customer(customer_key)
            .await?)
    }

    pub async fn latest_segmentation(
        &self,
        customer_id: &str,
    ) -> Result<Option<entity::ml_customer_segment::Model>, Error> {
        let customer_key = self.known_customer(customer_id).await?;

        Ok(CustomerSegmentRepository::new(self.db)
            .latest_for_customer(customer_key)
            .await?)
    }

    pub async fn latest_lifetime_value(
        &self,
        customer_id: &str,
    ) -> Result<Option<entity::ml_customer_lifetime_value::Model>, Error> {
        let customer_key = self.known_customer(customer_id).await?;

        Ok(LifetimeValueRepository::new(self.db)
            .latest_for_customer(customer_key)
            .await?)
    }

    /// Every churn prediction for the customer, oldest first.
    pub async fn history_churn(
        &self,
        customer_id: &str,
    ) -> Result<Vec<entity::ml_churn_prediction::Model>, Error> {
        let customer_key = self.known_customer(customer_id).await?;

        Ok(ChurnPredictionRepository::new(self.db)
            .history_for_customer(customer_key)
            .await?)
    }

    pub async fn history_segmentation(
        &self,
        customer_id: &str,
    ) -> Result<Vec<entity::ml_customer_segment::Model>, Error> {
        let customer_key = self.known_customer(customer_id).await?;

        Ok(CustomerSegmentRepository::new(self.db)
            .history_for_customer(customer_key)
            .await?)
    }

    pub async fn history_lifetime_value(
        &self,
        customer_id: &str,
    ) -> Result<Vec<entity::ml_customer_lifetime_value::Model>, Error> {
        let customer_key = self.known_customer(customer_id).await?;

        Ok(LifetimeValueRepository::new(self.db)
            .history_for_customer(customer_key)
            .await?)
    }

    pub async fn history_market_basket_rules(
        &self,
    ) -> Result<Vec<entity::ml_market_basket_rule::Model>, Error> {
        Ok(MarketBasketRuleRepository::new(self.db).history().await?)
    }

    fn appended(&self) {
        if let Some(epoch) = &self.epoch {
            epoch.bump();
        }
    }

    async fn active_customer(&self, customer_id: &str) -> Result<i32, Error> {
        self.dimensions
            .lookup(DimensionKind::Customer, customer_id.trim())
            .await?
            .ok_or_else(|| Error::from(MlError::UnknownCustomerReference(customer_id.to_string())))
    }

    /// Resolves a customer for history queries; deactivated customers keep their history.
    async fn known_customer(&self, customer_id: &str) -> Result<i32, Error> {
        self.dimensions
            .find_customer(customer_id.trim())
            .await?
            .map(|stored| stored.surrogate_key)
            .ok_or_else(|| Error::from(MlError::UnknownCustomerReference(customer_id.to_string())))
    }

    async fn active_products(
        &self,
        product_ids: &[String],
        side: &'static str,
    ) -> Result<Vec<i32>, Error> {
        if product_ids.is_empty() {
            return Err(MlError::EmptyRuleSide(side).into());
        }

        let product_ids: Vec<String> = product_ids.iter().map(|id| id.trim().to_string()).collect();
        let found = self
            .dimensions
            .lookup_many(DimensionKind::Product, &product_ids)
            .await?;

        product_ids
            .iter()
            .map(|id| {
                found
                    .get(id)
                    .copied()
                    .ok_or_else(|| Error::from(MlError::UnknownProductReference(id.clone())))
            })
            .collect()
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Counts an ingestion outcome; only prediction-level errors are absorbed.
fn tally<T>(report: &mut IngestReport, reference: &str, result: Result<T, Error>) -> Result<(), Error> {
    match result {
        Ok(_) => report.ingested += 1,
        Err(Error::MlError(error)) => {
            tracing::warn!("Rejected prediction for {:?}: {}", reference, error);
            report.rejected.push(RejectedPrediction {
                reference: reference.to_string(),
                reason: error.to_string(),
            });
        }
        Err(error) => return Err(error),
    }

    Ok(())
}

fn log_report(kind: &str, model_version: &str, report: &IngestReport) {
    tracing::info!(
        "Ingested {} {} predictions from model {} ({} rejected)",
        report.ingested,
        kind,
        model_version,
        report.rejected.len()
    );
}
