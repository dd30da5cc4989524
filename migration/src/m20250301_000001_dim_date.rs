use sea_orm_migration::{prelude::*, schema::*};

static IDX_DIM_DATE_YEAR_MONTH: &str = "idx-dim_date-year-month";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DimDate::Table)
                    .if_not_exists()
                    .col(integer(DimDate::DateKey).primary_key())
                    .col(date_uniq(DimDate::FullDate))
                    .col(integer(DimDate::DayOfWeek))
                    .col(string(DimDate::DayName))
                    .col(integer(DimDate::DayOfMonth))
                    .col(integer(DimDate::DayOfYear))
                    .col(integer(DimDate::WeekOfYear))
                    .col(integer(DimDate::Month))
                    .col(string(DimDate::MonthName))
                    .col(integer(DimDate::Quarter))
                    .col(integer(DimDate::Year))
                    .col(boolean(DimDate::IsWeekend))
                    .col(boolean(DimDate::IsHoliday))
                    .col(string(DimDate::Season))
                    .col(integer(DimDate::FiscalQuarter))
                    .col(integer(DimDate::FiscalYear))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DIM_DATE_YEAR_MONTH)
                    .table(DimDate::Table)
                    .col(DimDate::Year)
                    .col(DimDate::Month)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DIM_DATE_YEAR_MONTH)
                    .table(DimDate::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DimDate::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum DimDate {
    Table,
    DateKey,
    FullDate,
    DayOfWeek,
    DayName,
    DayOfMonth,
    DayOfYear,
    WeekOfYear,
    Month,
    MonthName,
    Quarter,
    Year,
    IsWeekend,
    IsHoliday,
    Season,
    FiscalQuarter,
    FiscalYear,
}
