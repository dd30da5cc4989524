use std::collections::{HashMap, HashSet};

use migration::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::data::LOOKUP_CHUNK;

/// Rows per multi-row insert statement.
const INSERT_CHUNK: usize = 100;

pub struct FactRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> FactRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Existing facts for the given `(order_id, order_item_id)` keys.
    pub async fn find_by_keys(
        &self,
        keys: &[(String, i32)],
    ) -> Result<HashMap<(String, i32), entity::fact_sales::Model>, DbErr> {
        let mut order_ids: Vec<&str> = keys.iter().map(|(order_id, _)| order_id.as_str()).collect();
        order_ids.sort_unstable();
        order_ids.dedup();

        let mut found = HashMap::with_capacity(keys.len());
        for chunk in order_ids.chunks(LOOKUP_CHUNK) {
            let models = entity::prelude::FactSales::find()
                .filter(
                    entity::fact_sales::Column::OrderId
                        .is_in(chunk.iter().map(|id| id.to_string())),
                )
                .all(self.db)
                .await?;

            for model in models {
                found.insert((model.order_id.clone(), model.order_item_id), model);
            }
        }

        let wanted: HashSet<(&str, i32)> = keys
            .iter()
            .map(|(order_id, item_id)| (order_id.as_str(), *item_id))
            .collect();
        found.retain(|(order_id, item_id), _| wanted.contains(&(order_id.as_str(), *item_id)));
        Ok(found)
    }

    /// Inserts new facts; rows whose key already exists are skipped.
    pub async fn insert_many(
        &self,
        facts: Vec<entity::fact_sales::ActiveModel>,
    ) -> Result<(), DbErr> {
        let mut facts = facts.into_iter().peekable();
        while facts.peek().is_some() {
            let chunk: Vec<_> = facts.by_ref().take(INSERT_CHUNK).collect();

            entity::prelude::FactSales::insert_many(chunk)
                .on_conflict(
                    OnConflict::columns([
                        entity::fact_sales::Column::OrderId,
                        entity::fact_sales::Column::OrderItemId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(self.db)
                .await?;
        }

        Ok(())
    }

    /// Applies a partial update; the model must carry both primary key columns.
    pub async fn update(&self, fact: entity::fact_sales::ActiveModel) -> Result<(), DbErr> {
        fact.update(self.db).await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::FactSales::find().count(self.db).await
    }

    pub async fn all(&self) -> Result<Vec<entity::fact_sales::Model>, DbErr> {
        entity::prelude::FactSales::find()
            .order_by_asc(entity::fact_sales::Column::OrderId)
            .order_by_asc(entity::fact_sales::Column::OrderItemId)
            .all(self.db)
            .await
    }

    /// `(price, freight_value, total_value)` of every fact.
    pub async fn amounts(&self) -> Result<Vec<(f64, f64, f64)>, DbErr> {
        entity::prelude::FactSales::find()
            .select_only()
            .column(entity::fact_sales::Column::Price)
            .column(entity::fact_sales::Column::FreightValue)
            .column(entity::fact_sales::Column::TotalValue)
            .into_tuple::<(f64, f64, f64)>()
            .all(self.db)
            .await
    }

    pub async fn count_without_purchase_timestamp(&self) -> Result<u64, DbErr> {
        entity::prelude::FactSales::find()
            .filter(entity::fact_sales::Column::OrderPurchaseTimestamp.is_null())
            .count(self.db)
            .await
    }

    pub async fn count_delivered_without_delivery_date(&self) -> Result<u64, DbErr> {
        entity::prelude::FactSales::find()
            .filter(entity::fact_sales::Column::OrderDeliveredCustomerDate.is_not_null())
            .filter(entity::fact_sales::Column::DeliveryDateKey.is_null())
            .count(self.db)
            .await
    }
}
