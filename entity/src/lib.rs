//! sea-orm entity models for the storehouse warehouse schema.

pub mod prelude;

pub mod dim_customer;
pub mod dim_date;
pub mod dim_location;
pub mod dim_product;
pub mod dim_seller;
pub mod etl_quarantine;
pub mod etl_run;
pub mod fact_sales;
pub mod ml_churn_prediction;
pub mod ml_customer_lifetime_value;
pub mod ml_customer_segment;
pub mod ml_market_basket_rule;
