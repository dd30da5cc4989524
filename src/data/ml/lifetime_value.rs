use std::collections::HashMap;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use super::newest_per_customer;
use crate::model::ml::LifetimeValuePrediction;

pub struct LifetimeValueRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> LifetimeValueRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        customer_key: i32,
        prediction: &LifetimeValuePrediction,
        model_version: &str,
        predicted_at: NaiveDateTime,
    ) -> Result<entity::ml_customer_lifetime_value::Model, DbErr> {
        entity::prelude::MlCustomerLifetimeValue::insert(
            entity::ml_customer_lifetime_value::ActiveModel {
                customer_key: ActiveValue::Set(customer_key),
                predicted_value: ActiveValue::Set(prediction.predicted_value),
                horizon_months: ActiveValue::Set(prediction.horizon_months),
                model_version: ActiveValue::Set(model_version.to_string()),
                predicted_at: ActiveValue::Set(predicted_at),
                source_timestamp: ActiveValue::Set(prediction.source_timestamp),
                ..Default::default()
            },
        )
        .exec_with_returning(self.db)
        .await
    }

    pub async fn latest_for_customer(
        &self,
        customer_key: i32,
    ) -> Result<Option<entity::ml_customer_lifetime_value::Model>, DbErr> {
        entity::prelude::MlCustomerLifetimeValue::find()
            .filter(entity::ml_customer_lifetime_value::Column::CustomerKey.eq(customer_key))
            .order_by_desc(entity::ml_customer_lifetime_value::Column::PredictedAt)
            .order_by_desc(entity::ml_customer_lifetime_value::Column::Id)
            .one(self.db)
            .await
    }

    pub async fn history_for_customer(
        &self,
        customer_key: i32,
    ) -> Result<Vec<entity::ml_customer_lifetime_value::Model>, DbErr> {
        entity::prelude::MlCustomerLifetimeValue::find()
            .filter(entity::ml_customer_lifetime_value::Column::CustomerKey.eq(customer_key))
            .order_by_asc(entity::ml_customer_lifetime_value::Column::PredictedAt)
            .order_by_asc(entity::ml_customer_lifetime_value::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn latest_per_customer(
        &self,
    ) -> Result<HashMap<i32, entity::ml_customer_lifetime_value::Model>, DbErr> {
        let rows = entity::prelude::MlCustomerLifetimeValue::find()
            .filter(newest_per_customer::<entity::prelude::MlCustomerLifetimeValue>(
                entity::ml_customer_lifetime_value::Column::CustomerKey,
                entity::ml_customer_lifetime_value::Column::PredictedAt,
            ))
            .order_by_asc(entity::ml_customer_lifetime_value::Column::Id)
            .all(self.db)
            .await?;

        Ok(rows.into_iter().map(|row| (row.customer_key, row)).collect())
    }
}
