use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use migration::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::{
    data::{dimension::DimensionStore, LOOKUP_CHUNK},
    model::dimension::{CustomerAttributes, StoredDimension},
};

pub struct CustomerRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CustomerRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<entity::dim_customer::Model>, DbErr> {
        entity::prelude::DimCustomer::find()
            .filter(entity::dim_customer::Column::CustomerId.eq(customer_id))
            .one(self.db)
            .await
    }

    pub async fn count_without_natural_key(&self) -> Result<u64, DbErr> {
        entity::prelude::DimCustomer::find()
            .filter(entity::dim_customer::Column::CustomerId.eq(""))
            .count(self.db)
            .await
    }
}

impl<'a, C: ConnectionTrait> DimensionStore for CustomerRepository<'a, C> {
    type Attributes = CustomerAttributes;

    async fn find_by_natural_keys(
        &self,
        natural_keys: &[String],
    ) -> Result<Vec<StoredDimension<CustomerAttributes>>, DbErr> {
        let mut rows = Vec::with_capacity(natural_keys.len());

        for chunk in natural_keys.chunks(LOOKUP_CHUNK) {
            let models = entity::prelude::DimCustomer::find()
                .filter(entity::dim_customer::Column::CustomerId.is_in(chunk.iter().cloned()))
                .all(self.db)
                .await?;

            rows.extend(models.into_iter().map(stored));
        }

        Ok(rows)
    }

    async fn insert_missing(
        &self,
        rows: &[CustomerAttributes],
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        if rows.is_empty() {
            return Ok(());
        }

        let customers = rows.iter().map(|attrs| entity::dim_customer::ActiveModel {
            customer_id: ActiveValue::Set(attrs.customer_id.clone()),
            customer_unique_id: ActiveValue::Set(attrs.unique_id.clone()),
            customer_name: ActiveValue::Set(attrs.name.clone()),
            customer_city: ActiveValue::Set(attrs.city.clone()),
            customer_state: ActiveValue::Set(attrs.state.clone()),
            customer_zip_code_prefix: ActiveValue::Set(attrs.zip_code_prefix.clone()),
            customer_region: ActiveValue::Set(attrs.region.clone()),
            customer_tier: ActiveValue::Set(attrs.tier.clone()),
            is_active: ActiveValue::Set(true),
            created_date: ActiveValue::Set(now),
            updated_date: ActiveValue::Set(now),
            ..Default::default()
        });

        entity::prelude::DimCustomer::insert_many(customers)
            .on_conflict(
                OnConflict::column(entity::dim_customer::Column::CustomerId)
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
        attributes: &CustomerAttributes,
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        entity::dim_customer::ActiveModel {
            customer_key: ActiveValue::Unchanged(surrogate_key),
            customer_unique_id: ActiveValue::Set(attributes.unique_id.clone()),
            customer_name: ActiveValue::Set(attributes.name.clone()),
            customer_city: ActiveValue::Set(attributes.city.clone()),
            customer_state: ActiveValue::Set(attributes.state.clone()),
            customer_zip_code_prefix: ActiveValue::Set(attributes.zip_code_prefix.clone()),
            customer_region: ActiveValue::Set(attributes.region.clone()),
            customer_tier: ActiveValue::Set(attributes.tier.clone()),
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
            let found = entity::prelude::DimCustomer::find()
                .select_only()
                .column(entity::dim_customer::Column::CustomerKey)
                .filter(entity::dim_customer::Column::CustomerKey.is_in(chunk.iter().copied()))
                .into_tuple::<i32>()
                .all(self.db)
                .await?;

            keys.extend(found);
        }

        Ok(keys)
    }

    async fn natural_keys(&self) -> Result<HashMap<i32, String>, DbErr> {
        let pairs = entity::prelude::DimCustomer::find()
            .select_only()
            .column(entity::dim_customer::Column::CustomerKey)
            .column(entity::dim_customer::Column::CustomerId)
            .into_tuple::<(i32, String)>()
            .all(self.db)
            .await?;

        Ok(pairs.into_iter().collect())
    }

    async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::DimCustomer::find().count(self.db).await
    }

    async fn deactivate(&self, natural_key: &str, now: NaiveDateTime) -> Result<bool, DbErr> {
        let result = entity::prelude::DimCustomer::update_many()
            .col_expr(entity::dim_customer::Column::IsActive, Expr::value(false))
            .col_expr(entity::dim_customer::Column::UpdatedDate, Expr::value(now))
            .filter(entity::dim_customer::Column::CustomerId.eq(natural_key))
            .filter(entity::dim_customer::Column::IsActive.eq(true))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn stored(model: entity::dim_customer::Model) -> StoredDimension<CustomerAttributes> {
    StoredDimension {
        surrogate_key: model.customer_key,
        is_active: model.is_active,
        created_date: model.created_date,
        updated_date: model.updated_date,
        attributes: CustomerAttributes {
            customer_id: model.customer_id,
            unique_id: model.customer_unique_id,
            name: model.customer_name,
            city: model.customer_city,
            state: model.customer_state,
            zip_code_prefix: model.customer_zip_code_prefix,
            region: model.customer_region,
            tier: model.customer_tier,
        },
    }
}
