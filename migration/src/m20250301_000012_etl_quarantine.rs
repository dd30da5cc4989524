use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000011_etl_run::EtlRun;

static IDX_ETL_QUARANTINE_RUN_ID: &str = "idx-etl_quarantine-run_id";
static IDX_ETL_QUARANTINE_ORDER: &str = "idx-etl_quarantine-order_id-order_item_id";
static FK_ETL_QUARANTINE_RUN_ID: &str = "fk-etl_quarantine-run_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EtlQuarantine::Table)
                    .if_not_exists()
                    .col(pk_auto(EtlQuarantine::Id))
                    .col(integer(EtlQuarantine::RunId))
                    .col(string(EtlQuarantine::OrderId))
                    .col(integer(EtlQuarantine::OrderItemId))
                    .col(text(EtlQuarantine::Reasons))
                    .col(text(EtlQuarantine::Payload))
                    .col(timestamp(EtlQuarantine::QuarantinedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ETL_QUARANTINE_RUN_ID)
                            .from(EtlQuarantine::Table, EtlQuarantine::RunId)
                            .to(EtlRun::Table, EtlRun::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ETL_QUARANTINE_RUN_ID)
                    .table(EtlQuarantine::Table)
                    .col(EtlQuarantine::RunId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ETL_QUARANTINE_ORDER)
                    .table(EtlQuarantine::Table)
                    .col(EtlQuarantine::OrderId)
                    .col(EtlQuarantine::OrderItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ETL_QUARANTINE_ORDER)
                    .table(EtlQuarantine::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ETL_QUARANTINE_RUN_ID)
                    .table(EtlQuarantine::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(EtlQuarantine::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum EtlQuarantine {
    Table,
    Id,
    RunId,
    OrderId,
    OrderItemId,
    Reasons,
    Payload,
    QuarantinedAt,
}
