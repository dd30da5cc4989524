use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dim_date")]
pub struct Model {
    /// `yyyymmdd` encoded calendar date
    #[sea_orm(primary_key, auto_increment = false)]
    pub date_key: i32,
    #[sea_orm(unique)]
    pub full_date: Date,
    pub day_of_week: i32,
    pub day_name: String,
    pub day_of_month: i32,
    pub day_of_year: i32,
    pub week_of_year: i32,
    pub month: i32,
    pub month_name: String,
    pub quarter: i32,
    pub year: i32,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub season: String,
    pub fiscal_quarter: i32,
    pub fiscal_year: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
