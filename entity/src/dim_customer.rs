use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dim_customer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub customer_key: i32,
    #[sea_orm(unique)]
    pub customer_id: String,
    pub customer_unique_id: String,
    pub customer_name: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
    pub customer_zip_code_prefix: Option<String>,
    pub customer_region: Option<String>,
    pub customer_tier: Option<String>,
    pub is_active: bool,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fact_sales::Entity")]
    FactSales,
    #[sea_orm(has_many = "super::ml_churn_prediction::Entity")]
    MlChurnPrediction,
}

impl Related<super::fact_sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FactSales.def()
    }
}

impl Related<super::ml_churn_prediction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MlChurnPrediction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
