use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use migration::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::{
    data::{dimension::DimensionStore, LOOKUP_CHUNK},
    model::dimension::{ProductAttributes, StoredDimension},
};

pub struct ProductRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProductRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }
}

impl<'a, C: ConnectionTrait> DimensionStore for ProductRepository<'a, C> {
    type Attributes = ProductAttributes;

    async fn find_by_natural_keys(
        &self,
        natural_keys: &[String],
    ) -> Result<Vec<StoredDimension<ProductAttributes>>, DbErr> {
        let mut rows = Vec::with_capacity(natural_keys.len());

        for chunk in natural_keys.chunks(LOOKUP_CHUNK) {
            let models = entity::prelude::DimProduct::find()
                .filter(entity::dim_product::Column::ProductId.is_in(chunk.iter().cloned()))
                .all(self.db)
                .await?;

            rows.extend(models.into_iter().map(stored));
        }

        Ok(rows)
    }

    async fn insert_missing(
        &self,
        rows: &[ProductAttributes],
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        if rows.is_empty() {
            return Ok(());
        }

        let products = rows.iter().map(|attrs| entity::dim_product::ActiveModel {
            product_id: ActiveValue::Set(attrs.product_id.clone()),
            product_category_name: ActiveValue::Set(attrs.category_name.clone()),
            product_category_l1: ActiveValue::Set(attrs.category_l1.clone()),
            product_weight_g: ActiveValue::Set(attrs.weight_g),
            product_length_cm: ActiveValue::Set(attrs.length_cm),
            product_height_cm: ActiveValue::Set(attrs.height_cm),
            product_width_cm: ActiveValue::Set(attrs.width_cm),
            product_volume_cm3: ActiveValue::Set(attrs.volume_cm3()),
            product_density_g_cm3: ActiveValue::Set(attrs.density_g_cm3()),
            is_active: ActiveValue::Set(true),
            created_date: ActiveValue::Set(now),
            updated_date: ActiveValue::Set(now),
            ..Default::default()
        });

        entity::prelude::DimProduct::insert_many(products)
            .on_conflict(
                OnConflict::column(entity::dim_product::Column::ProductId)
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
        attributes: &ProductAttributes,
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        entity::dim_product::ActiveModel {
            product_key: ActiveValue::Unchanged(surrogate_key),
            product_category_name: ActiveValue::Set(attributes.category_name.clone()),
            product_category_l1: ActiveValue::Set(attributes.category_l1.clone()),
            product_weight_g: ActiveValue::Set(attributes.weight_g),
            product_length_cm: ActiveValue::Set(attributes.length_cm),
            product_height_cm: ActiveValue::Set(attributes.height_cm),
            product_width_cm: ActiveValue::Set(attributes.width_cm),
            product_volume_cm3: ActiveValue::Set(attributes.volume_cm3()),
            product_density_g_cm3: ActiveValue::Set(attributes.density_g_cm3()),
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
            let found = entity::prelude::DimProduct::find()
                .select_only()
                .column(entity::dim_product::Column::ProductKey)
                .filter(entity::dim_product::Column::ProductKey.is_in(chunk.iter().copied()))
                .into_tuple::<i32>()
                .all(self.db)
                .await?;

            keys.extend(found);
        }

        Ok(keys)
    }

    async fn natural_keys(&self) -> Result<HashMap<i32, String>, DbErr> {
        let pairs = entity::prelude::DimProduct::find()
            .select_only()
            .column(entity::dim_product::Column::ProductKey)
            .column(entity::dim_product::Column::ProductId)
            .into_tuple::<(i32, String)>()
            .all(self.db)
            .await?;

        Ok(pairs.into_iter().collect())
    }

    async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::DimProduct::find().count(self.db).await
    }

    async fn deactivate(&self, natural_key: &str, now: NaiveDateTime) -> Result<bool, DbErr> {
        let result = entity::prelude::DimProduct::update_many()
            .col_expr(entity::dim_product::Column::IsActive, Expr::value(false))
            .col_expr(entity::dim_product::Column::UpdatedDate, Expr::value(now))
            .filter(entity::dim_product::Column::ProductId.eq(natural_key))
            .filter(entity::dim_product::Column::IsActive.eq(true))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn stored(model: entity::dim_product::Model) -> StoredDimension<ProductAttributes> {
    StoredDimension {
        surrogate_key: model.product_key,
        is_active: model.is_active,
        created_date: model.created_date,
        updated_date: model.updated_date,
        attributes: ProductAttributes {
            product_id: model.product_id,
            category_name: model.product_category_name,
            category_l1: model.product_category_l1,
            weight_g: model.product_weight_g,
            length_cm: model.product_length_cm,
            height_cm: model.product_height_cm,
            width_cm: model.product_width_cm,
        },
    }
}
