use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000002_dim_customer::DimCustomer;

static IDX_ML_CUSTOMER_LIFETIME_VALUE_CUSTOMER_KEY_PREDICTED_AT: &str = "idx-ml_customer_lifetime_value-customer_key-predicted_at";
static FK_ML_CUSTOMER_LIFETIME_VALUE_CUSTOMER_KEY: &str = "fk-ml_customer_lifetime_value-customer_key";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MlCustomerLifetimeValue::Table)
                    .if_not_exists()
                    .col(pk_auto(MlCustomerLifetimeValue::Id))
                    .col(integer(MlCustomerLifetimeValue::CustomerKey))
                    .col(double(MlCustomerLifetimeValue::PredictedValue))
                    .col(integer_null(MlCustomerLifetimeValue::HorizonMonths))
                    .col(string(MlCustomerLifetimeValue::ModelVersion))
                    .col(timestamp(MlCustomerLifetimeValue::PredictedAt))
                    .col(timestamp_null(MlCustomerLifetimeValue::SourceTimestamp))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ML_CUSTOMER_LIFETIME_VALUE_CUSTOMER_KEY)
                            .from(MlCustomerLifetimeValue::Table, MlCustomerLifetimeValue::CustomerKey)
                            .to(DimCustomer::Table, DimCustomer::CustomerKey),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ML_CUSTOMER_LIFETIME_VALUE_CUSTOMER_KEY_PREDICTED_AT)
                    .table(MlCustomerLifetimeValue::Table)
                    .col(MlCustomerLifetimeValue::CustomerKey)
                    .col(MlCustomerLifetimeValue::PredictedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ML_CUSTOMER_LIFETIME_VALUE_CUSTOMER_KEY_PREDICTED_AT)
                    .table(MlCustomerLifetimeValue::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(MlCustomerLifetimeValue::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum MlCustomerLifetimeValue {
    Table,
    Id,
    CustomerKey,
    PredictedValue,
    HorizonMonths,
    ModelVersion,
    PredictedAt,
    SourceTimestamp,
}
