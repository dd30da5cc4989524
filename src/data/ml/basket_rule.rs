use chrono::NaiveDateTime;
use sea_orm::{ActiveValue, ConnectionTrait, DbErr, EntityTrait, QueryOrder};

use crate::model::ml::MarketBasketRule;

pub struct MarketBasketRuleRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> MarketBasketRuleRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Appends a rule; product sides are stored as JSON arrays of surrogate keys.
    pub async fn create(
        &self,
        antecedent_keys: &[i32],
        consequent_keys: &[i32],
        rule: &MarketBasketRule,
        model_version: &str,
        predicted_at: NaiveDateTime,
    ) -> Result<entity::ml_market_basket_rule::Model, DbErr> {
        let antecedents =
            serde_json::to_string(antecedent_keys).map_err(|e| DbErr::Custom(e.to_string()))?;
        let consequents =
            serde_json::to_string(consequent_keys).map_err(|e| DbErr::Custom(e.to_string()))?;

        entity::prelude::MlMarketBasketRule::insert(entity::ml_market_basket_rule::ActiveModel {
            antecedent_product_keys: ActiveValue::Set(antecedents),
            consequent_product_keys: ActiveValue::Set(consequents),
            support: ActiveValue::Set(rule.support),
            confidence: ActiveValue::Set(rule.confidence),
            lift: ActiveValue::Set(rule.lift),
            model_version: ActiveValue::Set(model_version.to_string()),
            predicted_at: ActiveValue::Set(predicted_at),
            source_timestamp: ActiveValue::Set(rule.source_timestamp),
            ..Default::default()
        })
        .exec_with_returning(self.db)
        .await
    }

    /// Every stored rule, oldest first.
    pub async fn history(&self) -> Result<Vec<entity::ml_market_basket_rule::Model>, DbErr> {
        entity::prelude::MlMarketBasketRule::find()
            .order_by_asc(entity::ml_market_basket_rule::Column::PredictedAt)
            .order_by_asc(entity::ml_market_basket_rule::Column::Id)
            .all(self.db)
            .await
    }
}
