use std::collections::HashSet;

use chrono::NaiveDate;
use migration::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect,
};

use crate::{data::LOOKUP_CHUNK, model::calendar::CalendarRow};

pub struct CalendarRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CalendarRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_date_keys(
        &self,
        date_keys: &[i32],
    ) -> Result<Vec<entity::dim_date::Model>, DbErr> {
        let mut rows = Vec::with_capacity(date_keys.len());

        for chunk in date_keys.chunks(LOOKUP_CHUNK) {
            let models = entity::prelude::DimDate::find()
                .filter(entity::dim_date::Column::DateKey.is_in(chunk.iter().copied()))
                .all(self.db)
                .await?;
            rows.extend(models);
        }

        Ok(rows)
    }

    /// Inserts calendar rows, skipping date keys that already exist.
    pub async fn insert_missing(&self, rows: &[CalendarRow]) -> Result<(), DbErr> {
        for chunk in rows.chunks(LOOKUP_CHUNK) {
            let models = chunk.iter().map(entity::dim_date::ActiveModel::from);

            entity::prelude::DimDate::insert_many(models)
                .on_conflict(
                    OnConflict::column(entity::dim_date::Column::DateKey)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.db)
                .await?;
        }

        Ok(())
    }

    /// Rewrites every attribute of an existing calendar row.
    pub async fn update(&self, row: &CalendarRow) -> Result<(), DbErr> {
        let mut model = entity::dim_date::ActiveModel::from(row);
        model.date_key = sea_orm::ActiveValue::Unchanged(row.date_key);
        model.update(self.db).await?;

        Ok(())
    }

    /// Date keys present in `start..=end`.
    pub async fn date_keys_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashSet<i32>, DbErr> {
        let keys = entity::prelude::DimDate::find()
            .select_only()
            .column(entity::dim_date::Column::DateKey)
            .filter(entity::dim_date::Column::FullDate.between(start, end))
            .into_tuple::<i32>()
            .all(self.db)
            .await?;

        Ok(keys.into_iter().collect())
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::DimDate::find().count(self.db).await
    }
}
