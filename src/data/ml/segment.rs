use std::collections::HashMap;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use super::newest_per_customer;
use crate::model::ml::SegmentPrediction;

pub struct CustomerSegmentRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CustomerSegmentRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        customer_key: i32,
        prediction: &SegmentPrediction,
        model_version: &str,
        predicted_at: NaiveDateTime,
    ) -> Result<entity::ml_customer_segment::Model, DbErr> {
        entity::prelude::MlCustomerSegment::insert(entity::ml_customer_segment::ActiveModel {
            customer_key: ActiveValue::Set(customer_key),
            segment_id: ActiveValue::Set(prediction.segment_id),
            segment_name: ActiveValue::Set(prediction.segment_name.clone()),
            segment_probability: ActiveValue::Set(prediction.segment_probability),
            rfm_score: ActiveValue::Set(prediction.rfm_score),
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
    ) -> Result<Option<entity::ml_customer_segment::Model>, DbErr> {
        entity::prelude::MlCustomerSegment::find()
            .filter(entity::ml_customer_segment::Column::CustomerKey.eq(customer_key))
            .order_by_desc(entity::ml_customer_segment::Column::PredictedAt)
            .order_by_desc(entity::ml_customer_segment::Column::Id)
            .one(self.db)
            .await
    }

    pub async fn history_for_customer(
        &self,
        customer_key: i32,
    ) -> Result<Vec<entity::ml_customer_segment::Model>, DbErr> {
        entity::prelude::MlCustomerSegment::find()
            .filter(entity::ml_customer_segment::Column::CustomerKey.eq(customer_key))
            .order_by_asc(entity::ml_customer_segment::Column::PredictedAt)
            .order_by_asc(entity::ml_customer_segment::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn latest_per_customer(
        &self,
    ) -> Result<HashMap<i32, entity::ml_customer_segment::Model>, DbErr> {
        let rows = entity::prelude::MlCustomerSegment::find()
            .filter(newest_per_customer::<entity::prelude::MlCustomerSegment>(
                entity::ml_customer_segment::Column::CustomerKey,
                entity::ml_customer_segment::Column::PredictedAt,
            ))
            .order_by_asc(entity::ml_customer_segment::Column::Id)
            .all(self.db)
            .await?;

        Ok(rows.into_iter().map(|row| (row.customer_key, row)).collect())
    }
}
