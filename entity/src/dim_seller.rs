use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dim_seller")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub seller_key: i32,
    #[sea_orm(unique)]
    pub seller_id: String,
    pub seller_name: Option<String>,
    pub seller_city: Option<String>,
    pub seller_state: Option<String>,
    pub seller_zip_code_prefix: Option<String>,
    pub seller_region: Option<String>,
    pub is_active: bool,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fact_sales::Entity")]
    FactSales,
}

impl Related<super::fact_sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FactSales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
