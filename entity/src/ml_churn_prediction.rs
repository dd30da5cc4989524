use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ml_churn_prediction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_key: i32,
    pub churn_probability: f64,
    pub churn_risk: String,
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

impl Related<super::dim_customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DimCustomer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
