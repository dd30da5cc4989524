use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dim_product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub product_key: i32,
    #[sea_orm(unique)]
    pub product_id: String,
    pub product_category_name: Option<String>,
    pub product_category_l1: Option<String>,
    pub product_weight_g: Option<f64>,
    pub product_length_cm: Option<f64>,
    pub product_height_cm: Option<f64>,
    pub product_width_cm: Option<f64>,
    pub product_volume_cm3: Option<f64>,
    pub product_density_g_cm3: Option<f64>,
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
