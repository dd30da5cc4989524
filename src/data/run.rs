use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr, EntityTrait};

use crate::model::report::{RunReport, RunStatus};

pub struct RunRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RunRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Opens a run row in the `running` state.
    pub async fn start(&self, started_at: NaiveDateTime) -> Result<entity::etl_run::Model, DbErr> {
        entity::prelude::EtlRun::insert(entity::etl_run::ActiveModel {
            status: ActiveValue::Set(RunStatus::Running.to_string()),
            rows_processed: ActiveValue::Set(0),
            rows_loaded: ActiveValue::Set(0),
            rows_quarantined: ActiveValue::Set(0),
            dimensions_inserted: ActiveValue::Set(0),
            dimensions_updated: ActiveValue::Set(0),
            dimensions_unchanged: ActiveValue::Set(0),
            abort_cause: ActiveValue::Set(None),
            started_at: ActiveValue::Set(started_at),
            finished_at: ActiveValue::Set(None),
            ..Default::default()
        })
        .exec_with_returning(self.db)
        .await
    }

    /// Records the final counts and status of a run.
    pub async fn finish(&self, run_id: i32, report: &RunReport) -> Result<(), DbErr> {
        entity::etl_run::ActiveModel {
            id: ActiveValue::Unchanged(run_id),
            status: ActiveValue::Set(report.status.to_string()),
            rows_processed: ActiveValue::Set(to_i32(report.rows_processed)),
            rows_loaded: ActiveValue::Set(to_i32(report.rows_loaded)),
            rows_quarantined: ActiveValue::Set(to_i32(report.quarantined.len())),
            dimensions_inserted: ActiveValue::Set(to_i32(report.dimensions.inserted)),
            dimensions_updated: ActiveValue::Set(to_i32(report.dimensions.updated)),
            dimensions_unchanged: ActiveValue::Set(to_i32(report.dimensions.unchanged)),
            abort_cause: ActiveValue::Set(report.abort_cause.clone()),
            finished_at: ActiveValue::Set(report.finished_at),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, run_id: i32) -> Result<Option<entity::etl_run::Model>, DbErr> {
        entity::prelude::EtlRun::find_by_id(run_id).one(self.db).await
    }
}

fn to_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
