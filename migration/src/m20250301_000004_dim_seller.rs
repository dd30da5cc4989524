use sea_orm_migration::{prelude::*, schema::*};

static IDX_DIM_SELLER_STATE: &str = "idx-dim_seller-seller_state";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DimSeller::Table)
                    .if_not_exists()
                    .col(pk_auto(DimSeller::SellerKey))
                    .col(string_uniq(DimSeller::SellerId))
                    .col(string_null(DimSeller::SellerName))
                    .col(string_null(DimSeller::SellerCity))
                    .col(string_null(DimSeller::SellerState))
                    .col(string_null(DimSeller::SellerZipCodePrefix))
                    .col(string_null(DimSeller::SellerRegion))
                    .col(boolean(DimSeller::IsActive))
                    .col(timestamp(DimSeller::CreatedDate))
                    .col(timestamp(DimSeller::UpdatedDate))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DIM_SELLER_STATE)
                    .table(DimSeller::Table)
                    .col(DimSeller::SellerState)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DIM_SELLER_STATE)
                    .table(DimSeller::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DimSeller::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum DimSeller {
    Table,
    SellerKey,
    SellerId,
    SellerName,
    SellerCity,
    SellerState,
    SellerZipCodePrefix,
    SellerRegion,
    IsActive,
    CreatedDate,
    UpdatedDate,
}
