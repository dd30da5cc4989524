pub use sea_orm_migration::prelude::*;

mod m20250301_000001_dim_date;
mod m20250301_000002_dim_customer;
mod m20250301_000003_dim_product;
mod m20250301_000004_dim_seller;
mod m20250301_000005_dim_location;
mod m20250301_000006_fact_sales;
mod m20250301_000007_ml_customer_segment;
mod m20250301_000008_ml_churn_prediction;
mod m20250301_000009_ml_customer_lifetime_value;
mod m20250301_000010_ml_market_basket_rule;
mod m20250301_000011_etl_run;
mod m20250301_000012_etl_quarantine;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_dim_date::Migration),
            Box::new(m20250301_000002_dim_customer::Migration),
            Box::new(m20250301_000003_dim_product::Migration),
            Box::new(m20250301_000004_dim_seller::Migration),
            Box::new(m20250301_000005_dim_location::Migration),
            Box::new(m20250301_000006_fact_sales::Migration),
            Box::new(m20250301_000007_ml_customer_segment::Migration),
            Box::new(m20250301_000008_ml_churn_prediction::Migration),
            Box::new(m20250301_000009_ml_customer_lifetime_value::Migration),
            Box::new(m20250301_000010_ml_market_basket_rule::Migration),
            Box::new(m20250301_000011_etl_run::Migration),
            Box::new(m20250301_000012_etl_quarantine::Migration),
        ]
    }
}
