use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use migration::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::{
    data::{dimension::DimensionStore, LOOKUP_CHUNK},
    model::dimension::{SellerAttributes, StoredDimension},
};

pub struct SellerRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SellerRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }
}

impl<'a, C: ConnectionTrait> DimensionStore for SellerRepository<'a, C> {
    type Attributes = SellerAttributes;

    async fn find_by_natural_keys(
        &self,
        natural_keys: &[String],
    ) -> Result<Vec<StoredDimension<SellerAttributes>>, DbErr> {
        let mut rows = Vec::with_capacity(natural_keys.len());

        for chunk in natural_keys.chunks(LOOKUP_CHUNK) {
            let models = entity::prelude::DimSeller::find()
                .filter(entity::dim_seller::Column::SellerId.is_in(chunk.iter().cloned()))
                .all(self.db)
                .await?;

            rows.extend(models.into_iter().map(stored));
        }

        Ok(rows)
    }

    async fn insert_missing(
        &self,
        rows: &[SellerAttributes],
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        if rows.is_empty() {
            return Ok(());
        }

        let sellers = rows.iter().map(|attrs| entity::dim_seller::ActiveModel {
            seller_id: ActiveValue::Set(attrs.seller_id.clone()),
            seller_name: ActiveValue::Set(attrs.name.clone()),
            seller_city: ActiveValue::Set(attrs.city.clone()),
            seller_state: ActiveValue::Set(attrs.state.clone()),
            seller_zip_code_prefix: ActiveValue::Set(attrs.zip_code_prefix.clone()),
            seller_region: ActiveValue::Set(attrs.region.clone()),
            is_active: ActiveValue::Set(true),
            created_date: ActiveValue::Set(now),
            updated_date: ActiveValue::Set(now),
            ..Default::default()
        });

        entity::prelude::DimSeller::insert_many(sellers)
            .on_conflict(
                OnConflict::column(entity::dim_seller::Column::SellerId)
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
        attributes: &SellerAttributes,
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        entity::dim_seller::ActiveModel {
            seller_key: ActiveValue::Unchanged(surrogate_key),
            seller_name: ActiveValue::Set(attributes.name.clone()),
            seller_city: ActiveValue::Set(attributes.city.clone()),
            seller_state: ActiveValue::Set(attributes.state.clone()),
            seller_zip_code_prefix: ActiveValue::Set(attributes.zip_code_prefix.clone()),
            seller_region: ActiveValue::Set(attributes.region.clone()),
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
            let found = entity::prelude::DimSeller::find()
                .select_only()
                .column(entity::dim_seller::Column::SellerKey)
                .filter(entity::dim_seller::Column::SellerKey.is_in(chunk.iter().copied()))
                .into_tuple::<i32>()
                .all(self.db)
                .await?;

            keys.extend(found);
        }

        Ok(keys)
    }

    async fn natural_keys(&self) -> Result<HashMap<i32, String>, DbErr> {
        let pairs = entity::prelude::DimSeller::find()
            .select_only()
            .column(entity::dim_seller::Column::SellerKey)
            .column(entity::dim_seller::Column::SellerId)
            .into_tuple::<(i32, String)>()
            .all(self.db)
            .await?;

        Ok(pairs.into_iter().collect())
    }

    async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::DimSeller::find().count(self.db).await
    }

    async fn deactivate(&self, natural_key: &str, now: NaiveDateTime) -> Result<bool, DbErr> {
        let result = entity::prelude::DimSeller::update_many()
            .col_expr(entity::dim_seller::Column::IsActive, Expr::value(false))
            .col_expr(entity::dim_seller::Column::UpdatedDate, Expr::value(now))
            .filter(entity::dim_seller::Column::SellerId.eq(natural_key))
            .filter(entity::dim_seller::Column::IsActive.eq(true))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn stored(model: entity::dim_seller::Model) -> StoredDimension<SellerAttributes> {
    StoredDimension {
        surrogate_key: model.seller_key,
        is_active: model.is_active,
        created_date: model.created_date,
        updated_date: model.updated_date,
        attributes: SellerAttributes {
            seller_id: model.seller_id,
            name: model.seller_name,
            city: model.seller_city,
            state: model.seller_state,
            zip_code_prefix: model.seller_zip_code_prefix,
            region: model.seller_region,
        },
    }
}
