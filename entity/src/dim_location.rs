use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dim_location")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub location_key: i32,
    /// Normalized `zip|city|state` triple
    #[sea_orm(unique)]
    pub location_id: String,
    pub zip_code_prefix: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
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
