use sea_orm_migration::{prelude::*, schema::*};

use crate::{
    m20250301_000001_dim_date::DimDate, m20250301_000002_dim_customer::DimCustomer,
    m20250301_000003_dim_product::DimProduct, m20250301_000004_dim_seller::DimSeller,
    m20250301_000005_dim_location::DimLocation,
};

static IDX_FACT_SALES_CUSTOMER_KEY: &str = "idx-fact_sales-customer_key";
static IDX_FACT_SALES_PRODUCT_KEY: &str = "idx-fact_sales-product_key";
static IDX_FACT_SALES_SELLER_KEY: &str = "idx-fact_sales-seller_key";
static IDX_FACT_SALES_LOCATION_KEY: &str = "idx-fact_sales-location_key";
static IDX_FACT_SALES_ORDER_DATE_KEY: &str = "idx-fact_sales-order_date_key";
static IDX_FACT_SALES_DELIVERY_DATE_KEY: &str = "idx-fact_sales-delivery_date_key";
static FK_FACT_SALES_CUSTOMER_KEY: &str = "fk-fact_sales-customer_key";
static FK_FACT_SALES_PRODUCT_KEY: &str = "fk-fact_sales-product_key";
static FK_FACT_SALES_SELLER_KEY: &str = "fk-fact_sales-seller_key";
static FK_FACT_SALES_LOCATION_KEY: &str = "fk-fact_sales-location_key";
static FK_FACT_SALES_ORDER_DATE_KEY: &str = "fk-fact_sales-order_date_key";
static FK_FACT_SALES_DELIVERY_DATE_KEY: &str = "fk-fact_sales-delivery_date_key";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FactSales::Table)
                    .if_not_exists()
                    .col(string(FactSales::OrderId))
                    .col(integer(FactSales::OrderItemId))
                    .col(integer(FactSales::CustomerKey))
                    .col(integer(FactSales::ProductKey))
                    .col(integer(FactSales::SellerKey))
                    .col(integer(FactSales::LocationKey))
                    .col(integer(FactSales::OrderDateKey))
                    .col(integer_null(FactSales::DeliveryDateKey))
                    .col(string(FactSales::OrderStatus))
                    .col(double(FactSales::Price))
                    .col(double(FactSales::FreightValue))
                    .col(double(FactSales::TotalValue))
                    .col(integer(FactSales::PaymentInstallments))
                    .col(timestamp(FactSales::OrderPurchaseTimestamp))
                    .col(timestamp_null(FactSales::OrderApprovedAt))
                    .col(timestamp_null(FactSales::OrderDeliveredCarrierDate))
                    .col(timestamp_null(FactSales::OrderDeliveredCustomerDate))
                    .col(timestamp_null(FactSales::OrderEstimatedDeliveryDate))
                    .col(integer_null(FactSales::DeliveryDelayDays))
                    .col(integer_null(FactSales::ProcessingTimeHours))
                    .col(boolean_null(FactSales::IsDeliveredOntime))
                    .col(boolean_null(FactSales::IsFastDelivery))
                    .col(timestamp(FactSales::CreatedDate))
                    .col(timestamp(FactSales::UpdatedDate))
                    .primary_key(
                        Index::create()
                            .col(FactSales::OrderId)
                            .col(FactSales::OrderItemId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FACT_SALES_CUSTOMER_KEY)
                            .from(FactSales::Table, FactSales::CustomerKey)
                            .to(DimCustomer::Table, DimCustomer::CustomerKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FACT_SALES_PRODUCT_KEY)
                            .from(FactSales::Table, FactSales::ProductKey)
                            .to(DimProduct::Table, DimProduct::ProductKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FACT_SALES_SELLER_KEY)
                            .from(FactSales::Table, FactSales::SellerKey)
                            .to(DimSeller::Table, DimSeller::SellerKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FACT_SALES_LOCATION_KEY)
                            .from(FactSales::Table, FactSales::LocationKey)
                            .to(DimLocation::Table, DimLocation::LocationKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FACT_SALES_ORDER_DATE_KEY)
                            .from(FactSales::Table, FactSales::OrderDateKey)
                            .to(DimDate::Table, DimDate::DateKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FACT_SALES_DELIVERY_DATE_KEY)
                            .from(FactSales::Table, FactSales::DeliveryDateKey)
                            .to(DimDate::Table, DimDate::DateKey),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            (IDX_FACT_SALES_CUSTOMER_KEY, FactSales::CustomerKey),
            (IDX_FACT_SALES_PRODUCT_KEY, FactSales::ProductKey),
            (IDX_FACT_SALES_SELLER_KEY, FactSales::SellerKey),
            (IDX_FACT_SALES_LOCATION_KEY, FactSales::LocationKey),
            (IDX_FACT_SALES_ORDER_DATE_KEY, FactSales::OrderDateKey),
            (IDX_FACT_SALES_DELIVERY_DATE_KEY, FactSales::DeliveryDateKey),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(FactSales::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            IDX_FACT_SALES_DELIVERY_DATE_KEY,
            IDX_FACT_SALES_ORDER_DATE_KEY,
            IDX_FACT_SALES_LOCATION_KEY,
            IDX_FACT_SALES_SELLER_KEY,
            IDX_FACT_SALES_PRODUCT_KEY,
            IDX_FACT_SALES_CUSTOMER_KEY,
        ] {
            manager
                .drop_index(Index::drop().name(name).table(FactSales::Table).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(FactSales::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum FactSales {
    Table,
    OrderId,
    OrderItemId,
    CustomerKey,
    ProductKey,
    SellerKey,
    LocationKey,
    OrderDateKey,
    DeliveryDateKey,
    OrderStatus,
    Price,
    FreightValue,
    TotalValue,
    PaymentInstallments,
    OrderPurchaseTimestamp,
    OrderApprovedAt,
    OrderDeliveredCarrierDate,
    OrderDeliveredCustomerDate,
    OrderEstimatedDeliveryDate,
    DeliveryDelayDays,
    ProcessingTimeHours,
    IsDeliveredOntime,
    IsFastDelivery,
    CreatedDate,
    UpdatedDate,
}
