use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000002_dim_customer::DimCustomer;

static IDX_ML_CHURN_PREDICTION_CUSTOMER_KEY_PREDICTED_AT: &str = "idx-ml_churn_prediction-customer_key-predicted_at";
static FK_ML_CHURN_PREDICTION_CUSTOMER_KEY: &str = "fk-ml_churn_prediction-customer_key";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MlChurnPrediction::Table)
                    .if_not_exists()
                    .col(pk_auto(MlChurnPrediction::Id))
                    .col(integer(MlChurnPrediction::CustomerKey))
                    .col(double(MlChurnPrediction::ChurnProbability))
                    .col(string(MlChurnPrediction::ChurnRisk))
                    .col(string(MlChurnPrediction::ModelVersion))
                    .col(timestamp(MlChurnPrediction::PredictedAt))
                    .col(timestamp_null(MlChurnPrediction::SourceTimestamp))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ML_CHURN_PREDICTION_CUSTOMER_KEY)
                            .from(MlChurnPrediction::Table, MlChurnPrediction::CustomerKey)
                            .to(DimCustomer::Table, DimCustomer::CustomerKey),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ML_CHURN_PREDICTION_CUSTOMER_KEY_PREDICTED_AT)
                    .table(MlChurnPrediction::Table)
                    .col(MlChurnPrediction::CustomerKey)
                    .col(MlChurnPrediction::PredictedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ML_CHURN_PREDICTION_CUSTOMER_KEY_PREDICTED_AT)
                    .table(MlChurnPrediction::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(MlChurnPrediction::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum MlChurnPrediction {
    Table,
    Id,
    CustomerKey,
    ChurnProbability,
    ChurnRisk,
    ModelVersion,
    PredictedAt,
    SourceTimestamp,
}
