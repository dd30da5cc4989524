use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ml_market_basket_rule")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// JSON array of product surrogate keys
    pub antecedent_product_keys: String,
    /// JSON array of product surrogate keys
    pub consequent_product_keys: String,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub model_version: String,
    pub predicted_at: DateTime,
    pub source_timestamp: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
