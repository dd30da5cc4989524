use std::collections::HashMap;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use super::newest_per_customer;
use crate::model::ml::{ChurnPrediction, ChurnRisk};

pub struct ChurnPredictionRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ChurnPredictionRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        customer_key: i32,
        prediction: &ChurnPrediction,
        model_version: &str,
        predicted_at: NaiveDateTime,
    ) -> Result<entity::ml_churn_prediction::Model, DbErr> {
        let churn_risk = prediction
            .churn_risk
            .clone()
            .unwrap_or_else(|| ChurnRisk::from_probability(prediction.churn_probability).to_string());

        entity::prelude::MlChurnPrediction::insert(entity::ml_churn_prediction::ActiveModel {
            customer_key: ActiveValue::Set(customer_key),
            churn_probability: ActiveValue::Set(prediction.churn_probability),
            churn_risk: ActiveValue::Set(churn_risk),
            model_version: ActiveValue::Set(model_version.to_string()),
            predicted_at: ActiveValue::Set(predicted_at),
            source_timestamp: ActiveValue::Set(prediction.source_timestamp),
            ..Default::default()
        })
        .exec_with_returning(self.db)
        .await
    }

    pub async fn latest_for_customer(
        &self,
        customer_key: i32,
    ) -> Result<Option<entity::ml_churn_prediction::Model>, DbErr> {
        entity::prelude::MlChurnPrediction::find()
            .filter(entity::ml_churn_prediction::Column::CustomerKey.eq(customer_key))
            .order_by_desc(entity::ml_churn_prediction::Column::PredictedAt)
            .order_by_desc(entity::ml_churn_prediction::Column::Id)
            .one(self.db)
            .await
    }

    /// Every prediction for the customer, oldest first.
    pub async fn history_for_customer(
        &self,
        customer_key: i32,
    ) -> Result<Vec<entity::ml_churn_prediction::Model>, DbErr> {
        entity::prelude::MlChurnPrediction::find()
            .filter(entity::ml_churn_prediction::Column::CustomerKey.eq(customer_key))
            .order_by_asc(entity::ml_churn_prediction::Column::PredictedAt)
            .order_by_asc(entity::ml_churn_prediction::Column::Id)
            .all(self.db)
            .await
    }

    /// Current prediction per customer key.
    pub async fn latest_per_customer(
        &self,
    ) -> Result<HashMap<i32, entity::ml_churn_prediction::Model>, DbErr> {
        let rows = entity::prelude::MlChurnPrediction::find()
            .filter(newest_per_customer::<entity::prelude::MlChurnPrediction>(
                entity::ml_churn_prediction::Column::CustomerKey,
                entity::ml_churn_prediction::Column::PredictedAt,
            ))
            .order_by_asc(entity::ml_churn_prediction::Column::Id)
            .all(self.db)
            .await?;

        Ok(rows.into_iter().map(|row| (row.customer_key, row)).collect())
    }
}
