use sea_orm_migration::{prelude::*, schema::*};

static IDX_DIM_LOCATION_STATE_CITY: &str = "idx-dim_location-state-city";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DimLocation::Table)
                    .if_not_exists()
                    .col(pk_auto(DimLocation::LocationKey))
                    .col(string_uniq(DimLocation::LocationId))
                    .col(string_null(DimLocation::ZipCodePrefix))
                    .col(string_null(DimLocation::City))
                    .col(string_null(DimLocation::State))
                    .col(string_null(DimLocation::Region))
                    .col(boolean(DimLocation::IsActive))
                    .col(timestamp(DimLocation::CreatedDate))
                    .col(timestamp(DimLocation::UpdatedDate))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DIM_LOCATION_STATE_CITY)
                    .table(DimLocation::Table)
                    .col(DimLocation::State)
                    .col(DimLocation::City)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DIM_LOCATION_STATE_CITY)
                    .table(DimLocation::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DimLocation::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum DimLocation {
    Table,
    LocationKey,
    LocationId,
    ZipCodePrefix,
    City,
    State,
    Region,
    IsActive,
    CreatedDate,
    UpdatedDate,
}
