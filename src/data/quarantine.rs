use chrono::NaiveDateTime;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::model::quarantine::QuarantineEntry;

const INSERT_CHUNK: usize = 200;

pub struct QuarantineRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> QuarantineRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Persists the rejected rows of a run; reasons and payload are stored as JSON.
    pub async fn insert_many(
        &self,
        run_id: i32,
        entries: &[QuarantineEntry],
        quarantined_at: NaiveDateTime,
    ) -> Result<(), DbErr> {
        for chunk in entries.chunks(INSERT_CHUNK) {
            let rows = chunk
                .iter()
                .map(|entry| {
                    let reasons = serde_json::to_string(&entry.reasons)
                        .map_err(|e| DbErr::Custom(e.to_string()))?;

                    Ok(entity::etl_quarantine::ActiveModel {
                        run_id: ActiveValue::Set(run_id),
                        order_id: ActiveValue::Set(entry.order_id.clone()),
                        order_item_id: ActiveValue::Set(entry.order_item_id),
                        reasons: ActiveValue::Set(reasons),
                        payload: ActiveValue::Set(entry.payload.to_string()),
                        quarantined_at: ActiveValue::Set(quarantined_at),
                        ..Default::default()
                    })
                })
                .collect::<Result<Vec<_>, DbErr>>()?;

            entity::prelude::EtlQuarantine::insert_many(rows)
                .exec_without_returning(self.db)
                .await?;
        }

        Ok(())
    }

    pub async fn find_by_run(
        &self,
        run_id: i32,
    ) -> Result<Vec<entity::etl_quarantine::Model>, DbErr> {
        entity::prelude::EtlQuarantine::find()
            .filter(entity::etl_quarantine::Column::RunId.eq(run_id))
            .order_by_asc(entity::etl_quarantine::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::EtlQuarantine::find().count(self.db).await
    }
}
