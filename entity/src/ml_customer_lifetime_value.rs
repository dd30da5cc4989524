use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ml_customer_lifetime_value")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_key: i32,
    pub predicted_value: f64,
    pub horizon_months: Option<i32>,
    pub model_version: String,
    pub predicted_at: DateTime,
    pub source_timestamp: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dim_customer::Entity",
        from = "Column::CustomerKey",
        to = "super::dim_customer::Column::CustomerKey"
    )]
    DimCustomer,
}

impl ActiveModelBehavior for ActiveModel {}
