pub use super::dim_customer::Entity as DimCustomer;
pub use super::dim_date::Entity as DimDate;
pub use super::dim_location::Entity as DimLocation;
pub use super::dim_product::Entity as DimProduct;
pub use super::dim_seller::Entity as DimSeller;
pub use super::etl_quarantine::Entity as EtlQuarantine;
pub use super::etl_run::Entity as EtlRun;
pub use super::fact_sales::Entity as FactSales;
pub use super::ml_churn_prediction::Entity as MlChurnPrediction;
pub use super::ml_customer_lifetime_value::Entity as MlCustomerLifetimeValue;
pub use super::ml_customer_segment::Entity as MlCustomerSegment;
pub use super::ml_market_basket_rule::Entity as MlMarketBasketRule;
