use sea_orm_migration::{prelude::*, schema::*};

static IDX_ML_MARKET_BASKET_RULE_PREDICTED_AT: &str = "idx-ml_market_basket_rule-predicted_at";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MlMarketBasketRule::Table)
                    .if_not_exists()
                    .col(pk_auto(MlMarketBasketRule::Id))
                    .col(text(MlMarketBasketRule::AntecedentProductKeys))
                    .col(text(MlMarketBasketRule::ConsequentProductKeys))
                    .col(double(MlMarketBasketRule::Support))
                    .col(double(MlMarketBasketRule::Confidence))
                    .col(double(MlMarketBasketRule::Lift))
                    .col(string(MlMarketBasketRule::ModelVersion))
                    .col(timestamp(MlMarketBasketRule::PredictedAt))
                    .col(timestamp_null(MlMarketBasketRule::SourceTimestamp))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ML_MARKET_BASKET_RULE_PREDICTED_AT)
                    .table(MlMarketBasketRule::Table)
                    .col(MlMarketBasketRule::PredictedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ML_MARKET_BASKET_RULE_PREDICTED_AT)
                    .table(MlMarketBasketRule::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(MlMarketBasketRule::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum MlMarketBasketRule {
    Table,
    Id,
    AntecedentProductKeys,
    ConsequentProductKeys,
    Support,
    Confidence,
    Lift,
    ModelVersion,
    PredictedAt,
    SourceTimestamp,
}
