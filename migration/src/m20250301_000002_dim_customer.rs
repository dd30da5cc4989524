use sea_orm_migration::{prelude::*, schema::*};

static IDX_DIM_CUSTOMER_UNIQUE_ID: &str = "idx-dim_customer-customer_unique_id";
static IDX_DIM_CUSTOMER_CITY_TIER: &str = "idx-dim_customer-customer_city-customer_tier";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DimCustomer::Table)
                    .if_not_exists()
                    .col(pk_auto(DimCustomer::CustomerKey))
                    .col(string_uniq(DimCustomer::CustomerId))
                    .col(string(DimCustomer::CustomerUniqueId))
                    .col(string_null(DimCustomer::CustomerName))
                    .col(string_null(DimCustomer::CustomerCity))
                    .col(string_null(DimCustomer::CustomerState))
                    .col(string_null(DimCustomer::CustomerZipCodePrefix))
                    .col(string_null(DimCustomer::CustomerRegion))
                    .col(string_null(DimCustomer::CustomerTier))
                    .col(boolean(DimCustomer::IsActive))
                    .col(timestamp(DimCustomer::CreatedDate))
                    .col(timestamp(DimCustomer::UpdatedDate))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DIM_CUSTOMER_UNIQUE_ID)
                    .table(DimCustomer::Table)
                    .col(DimCustomer::CustomerUniqueId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DIM_CUSTOMER_CITY_TIER)
                    .table(DimCustomer::Table)
                    .col(DimCustomer::CustomerCity)
                    .col(DimCustomer::CustomerTier)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DIM_CUSTOMER_CITY_TIER)
                    .table(DimCustomer::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DIM_CUSTOMER_UNIQUE_ID)
                    .table(DimCustomer::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DimCustomer::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum DimCustomer {
    Table,
    CustomerKey,
    CustomerId,
    CustomerUniqueId,
    CustomerName,
    CustomerCity,
    CustomerState,
    CustomerZipCodePrefix,
    CustomerRegion,
    CustomerTier,
    IsActive,
    CreatedDate,
    UpdatedDate,
}
