//! Append-only repositories for ingested model predictions.
//!
//! Rows are never updated. The current prediction for a customer is the row with
//! the latest `predicted_at`, ties broken by the higher id.

pub mod basket_rule;
pub mod churn;
pub mod lifetime_value;
pub mod segment;

pub use basket_rule::MarketBasketRuleRepository;
pub use churn::ChurnPredictionRepository;
pub use lifetime_value::LifetimeValueRepository;
pub use segment::CustomerSegmentRepository;

use sea_orm::{
    sea_query::{Expr, ExprTrait},
    EntityTrait, QuerySelect, QueryTrait,
};

/// Matches each customer's rows at its latest `predicted_at`.
///
/// Several rows can match when they share that timestamp; callers keep the
/// highest id.
fn newest_per_customer<E: EntityTrait>(customer_key: E::Column, predicted_at: E::Column) -> Expr {
    let newest = E::find()
        .select_only()
        .column(customer_key)
        .column_as(Expr::col(predicted_at).max(), "newest")
        .group_by(customer_key)
        .into_query();

    Expr::tuple([Expr::col(customer_key), Expr::col(predicted_at)]).in_subquery(newest)
}
