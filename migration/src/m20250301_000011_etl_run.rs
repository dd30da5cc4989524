use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EtlRun::Table)
                    .if_not_exists()
                    .col(pk_auto(EtlRun::Id))
                    .col(string(EtlRun::Status))
                    .col(integer(EtlRun::RowsProcessed))
                    .col(integer(EtlRun::RowsLoaded))
                    .col(integer(EtlRun::RowsQuarantined))
                    .col(integer(EtlRun::DimensionsInserted))
                    .col(integer(EtlRun::DimensionsUpdated))
                    .col(integer(EtlRun::DimensionsUnchanged))
                    .col(text_null(EtlRun::AbortCause))
                    .col(timestamp(EtlRun::StartedAt))
                    .col(timestamp_null(EtlRun::FinishedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EtlRun::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum EtlRun {
    Table,
    Id,
    Status,
    RowsProcessed,
    RowsLoaded,
    RowsQuarantined,
    DimensionsInserted,
    DimensionsUpdated,
    DimensionsUnchanged,
    AbortCause,
    StartedAt,
    FinishedAt,
}
