use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fact_sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_item_id: i32,
    pub customer_key: i32,
    pub product_key: i32,
    pub seller_key: i32,
    pub location_key: i32,
    pub order_date_key: i32,
    pub delivery_date_key: Option<i32>,
    pub order_status: String,
    pub price: f64,
    pub freight_value: f64,
    pub total_value: f64,
    pub payment_installments: i32,
    pub order_purchase_timestamp: DateTime,
    pub order_approved_at: Option<DateTime>,
    pub order_delivered_carrier_date: Option<DateTime>,
    pub order_delivered_customer_date: Option<DateTime>,
    pub order_estimated_delivery_date: Option<DateTime>,
    pub delivery_delay_days: Option<i32>,
    pub processing_time_hours: Option<i32>,
    pub is_delivered_ontime: Option<bool>,
    pub is_fast_delivery: Option<bool>,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dim_customer::Entity",
        from = "Column::CustomerKey",
        to = "super::dim_customer::Column::CustomerKey"
    )]
    DimCustomer,
    #[sea_orm(
        belongs_to = "super::dim_product::Entity",
        from = "Column::ProductKey",
        to = "super::dim_product::Column::ProductKey"
    )]
    DimProduct,
    #[sea_orm(
        belongs_to = "super::dim_seller::Entity",
        from = "Column::SellerKey",
        to = "super::dim_seller::Column::SellerKey"
    )]
    DimSeller,
    #[sea_orm(
        belongs_to = "super::dim_location::Entity",
        from = "Column::LocationKey",
        to = "super::dim_location::Column::LocationKey"
    )]
    DimLocation,
    #[sea_orm(
        belongs_to = "super::dim_date::Entity",
        from = "Column::OrderDateKey",
        to = "super::dim_date::Column::DateKey"
    )]
    OrderDate,
    #[sea_orm(
        belongs_to = "super::dim_date::Entity",
        from = "Column::DeliveryDateKey",
        to = "super::dim_date::Column::DateKey"
    )]
    DeliveryDate,
}

impl Related<super::dim_customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DimCustomer.def()
    }
}

impl Related<super::dim_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DimProduct.def()
    }
}

impl Related<super::dim_seller::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DimSeller.def()
    }
}

impl Related<super::dim_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DimLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
