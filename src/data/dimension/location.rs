use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use migration::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::{
    data::{dimension::DimensionStore, LOOKUP_CHUNK},
    model::dimension::{LocationAttributes, StoredDimension},
};

/// Locations are derived from customer and seller addresses, keyed by `zip|city|state`.
pub struct LocationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> LocationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }
}

impl<'a, C: ConnectionTrait> DimensionStore for LocationRepository<'a, C> {
    type Attributes = LocationAttributes;

    async fn find_by_natural_keys(
        &self,
        natural_keys: &[String],
    ) -> Result<Vec<StoredDimension<LocationAttributes>>, DbErr> {
        let mut rows = Vec::with_capacity(natural_keys.len());

        for chunk in natural_keys.chunks(LOOKUP_CHUNK) {
            let models = entity::prelude::DimLocation::find()
                .filter(entity::dim_location::Column::LocationId.is_in(chunk.iter().cloned()))
                .all(self.db)
                .await?;

            rows.extend(models.into_iter().map(stored));
        }

        Ok(rows)
    }

    async fn insert_missing(
        &self,
        rows: &[LocationAttributes],
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        if rows.is_empty() {
            return Ok(());
        }

        let locations = rows.iter().map(|attrs| entity::dim_location::ActiveModel {
            location_id: ActiveValue::Set(attrs.location_id.clone()),
            zip_code_prefix: ActiveValue::Set(attrs.zip_code_prefix.clone()),
            city: ActiveValue::Set(attrs.city.clone()),
            state: ActiveValue::Set(attrs.state.clone()),
            region: ActiveValue::Set(attrs.region.clone()),
            is_active: ActiveValue::Set(true),
            created_date: ActiveValue::Set(now),
            updated_date: ActiveValue::Set(now),
            ..Default::default()
        });

        entity::prelude::DimLocation::insert_many(locations)
            .on_conflict(
                OnConflict::column(entity::dim_location::Column::LocationId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        Ok(())
    }

    async fn update_attributes(
        &self,
        surrogate_key: i32,
        attributes: &LocationAttributes,
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        entity::dim_location::ActiveModel {
            location_key: ActiveValue::Unchanged(surrogate_key),
            zip_code_prefix: ActiveValue::Set(attributes.zip_code_prefix.clone()),
            city: ActiveValue::Set(attributes.city.clone()),
            state: ActiveValue::Set(attributes.state.clone()),
            region: ActiveValue::Set(attributes.region.clone()),
            updated_date: ActiveValue::Set(now),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    async fn existing_keys(&self, surrogate_keys: &[i32]) -> Result<HashSet<i32>, DbErr> {
        let mut keys = HashSet::with_capacity(surrogate_keys.len());

        for chunk in surrogate_keys.chunks(LOOKUP_CHUNK) {
            let found = entity::prelude::DimLocation::find()
                .select_only()
                .column(entity::dim_location::Column::LocationKey)
                .filter(entity::dim_location::Column::LocationKey.is_in(chunk.iter().copied()))
                .into_tuple::<i32>()
                .all(self.db)
                .await?;

            keys.extend(found);
        }

        Ok(keys)
    }

    async fn natural_keys(&self) -> Result<HashMap<i32, String>, DbErr> {
        let pairs = entity::prelude::DimLocation::find()
            .select_only()
            .column(entity::dim_location::Column::LocationKey)
            .column(entity::dim_location::Column::LocationId)
            .into_tuple::<(i32, String)>()
            .all(self.db)
            .await?;

        Ok(pairs.into_iter().collect())
    }

    async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::DimLocation::find().count(self.db).await
    }

    async fn deactivate(&self, natural_key: &str, now: NaiveDateTime) -> Result<bool, DbErr> {
        let result = entity::prelude::DimLocation::update_many()
            .col_expr(entity::dim_location::Column::IsActive, Expr::value(false))
            .col_expr(entity::dim_location::Column::UpdatedDate, Expr::value(now))
            .filter(entity::dim_location::Column::LocationId.eq(natural_key))
            .filter(entity::dim_location::Column::IsActive.eq(true))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn stored(model: entity::dim_location::Model) -> StoredDimension<LocationAttributes> {
    StoredDimension {
        surrogate_key: model.location_key,
        is_active: model.is_active,
        created_date: model.created_date,
        updated_date: model.updated_date,
        attributes: LocationAttributes {
            location_id: model.location_id,
            zip_code_prefix: model.zip_code_prefix,
            city: model.city,
            state: model.state,
            region: model.region,
        },
    }
}
