use sea_orm_migration::{prelude::*, schema::*};

static IDX_DIM_PRODUCT_CATEGORY: &str = "idx-dim_product-product_category_name";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DimProduct::Table)
                    .if_not_exists()
                    .col(pk_auto(DimProduct::ProductKey))
                    .col(string_uniq(DimProduct::ProductId))
                    .col(string_null(DimProduct::ProductCategoryName))
                    .col(string_null(DimProduct::ProductCategoryL1))
                    .col(double_null(DimProduct::ProductWeightG))
                    .col(double_null(DimProduct::ProductLengthCm))
                    .col(double_null(DimProduct::ProductHeightCm))
                    .col(double_null(DimProduct::ProductWidthCm))
                    .col(double_null(DimProduct::ProductVolumeCm3))
                    .col(double_null(DimProduct::ProductDensityGCm3))
                    .col(boolean(DimProduct::IsActive))
                    .col(timestamp(DimProduct::CreatedDate))
                    .col(timestamp(DimProduct::UpdatedDate))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DIM_PRODUCT_CATEGORY)
                    .table(DimProduct::Table)
                    .col(DimProduct::ProductCategoryName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DIM_PRODUCT_CATEGORY)
                    .table(DimProduct::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DimProduct::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum DimProduct {
    Table,
    ProductKey,
    ProductId,
    ProductCategoryName,
    ProductCategoryL1,
    ProductWeightG,
    ProductLengthCm,
    ProductHeightCm,
    ProductWidthCm,
    ProductVolumeCm3,
    ProductDensityGCm3,
    IsActive,
    CreatedDate,
    UpdatedDate,
}
