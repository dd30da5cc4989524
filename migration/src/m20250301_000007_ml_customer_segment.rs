use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000002_dim_customer::DimCustomer;

static IDX_ML_CUSTOMER_SEGMENT_CUSTOMER_KEY_PREDICTED_AT: &str = "idx-ml_customer_segment-customer_key-predicted_at";
static FK_ML_CUSTOMER_SEGMENT_CUSTOMER_KEY: &str = "fk-ml_customer_segment-customer_key";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MlCustomerSegment::Table)
                    .if_not_exists()
                    .col(pk_auto(MlCustomerSegment::Id))
                    .col(integer(MlCustomerSegment::CustomerKey))
                    .col(integer(MlCustomerSegment::SegmentId))
                    .col(string(MlCustomerSegment::SegmentName))
                    .col(double_null(MlCustomerSegment::SegmentProbability))
                    .col(integer_null(MlCustomerSegment::RfmScore))
                    .col(string(MlCustomerSegment::ModelVersion))
                    .col(timestamp(MlCustomerSegment::PredictedAt))
                    .col(timestamp_null(MlCustomerSegment::SourceTimestamp))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ML_CUSTOMER_SEGMENT_CUSTOMER_KEY)
                            .from(MlCustomerSegment::Table, MlCustomerSegment::CustomerKey)
                            .to(DimCustomer::Table, DimCustomer::CustomerKey),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ML_CUSTOMER_SEGMENT_CUSTOMER_KEY_PREDICTED_AT)
                    .table(MlCustomerSegment::Table)
                    .col(MlCustomerSegment::CustomerKey)
                    .col(MlCustomerSegment::PredictedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ML_CUSTOMER_SEGMENT_CUSTOMER_KEY_PREDICTED_AT)
                    .table(MlCustomerSegment::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(MlCustomerSegment::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum MlCustomerSegment {
    Table,
    Id,
    CustomerKey,
    SegmentId,
    SegmentName,
    SegmentProbability,
    RfmScore,
    ModelVersion,
    PredictedAt,
    SourceTimestamp,
}
