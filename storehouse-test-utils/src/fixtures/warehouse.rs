//! Warehouse row fixtures.
//!
//! Each `insert_mock_*` method checks for an existing row with the same natural
//! key first so fixtures can be requested repeatedly within one test.

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
};

use crate::{error::TestError, fixtures::factory, TestContext};

const CALENDAR_CHUNK: usize = 500;

impl TestContext {
    /// Access warehouse fixture helpers bound to this context's database.
    pub fn warehouse(&self) -> WarehouseFixtures<'_> {
        WarehouseFixtures { ctx: self }
    }
}

pub struct WarehouseFixtures<'a> {
    ctx: &'a TestContext,
}

impl<'a> WarehouseFixtures<'a> {
    pub async fn insert_mock_customer(
        &self,
        customer_id: &str,
    ) -> Result<entity::dim_customer::Model, TestError> {
        if let Some(existing) = entity::prelude::DimCustomer::find()
            .filter(entity::dim_customer::Column::CustomerId.eq(customer_id))
            .one(&self.ctx.db)
            .await?
        {
            return Ok(existing);
        }

        let mut model = factory::mock_customer_model(0, customer_id)
            .into_active_model()
            .reset_all();
        model.customer_key = ActiveValue::NotSet;

        Ok(entity::prelude::DimCustomer::insert(model)
            .exec_with_returning(&self.ctx.db)
            .await?)
    }

    pub async fn insert_mock_product(
        &self,
        product_id: &str,
    ) -> Result<entity::dim_product::Model, TestError> {
        if let Some(existing) = entity::prelude::DimProduct::find()
            .filter(entity::dim_product::Column::ProductId.eq(product_id))
            .one(&self.ctx.db)
            .await?
        {
            return Ok(existing);
        }

        let mut model = factory::mock_product_model(0, product_id)
            .into_active_model()
            .reset_all();
        model.product_key = ActiveValue::NotSet;

        Ok(entity::prelude::DimProduct::insert(model)
            .exec_with_returning(&self.ctx.db)
            .await?)
    }

    pub async fn insert_mock_seller(
        &self,
        seller_id: &str,
    ) -> Result<entity::dim_seller::Model, TestError> {
        if let Some(existing) = entity::prelude::DimSeller::find()
            .filter(entity::dim_seller::Column::SellerId.eq(seller_id))
            .one(&self.ctx.db)
            .await?
        {
            return Ok(existing);
        }

        let mut model = factory::mock_seller_model(0, seller_id)
            .into_active_model()
            .reset_all();
        model.seller_key = ActiveValue::NotSet;

        Ok(entity::prelude::DimSeller::insert(model)
            .exec_with_returning(&self.ctx.db)
            .await?)
    }

    pub async fn insert_mock_location(
        &self,
        location_id: &str,
    ) -> Result<entity::dim_location::Model, TestError> {
        if let Some(existing) = entity::prelude::DimLocation::find()
            .filter(entity::dim_location::Column::LocationId.eq(location_id))
            .one(&self.ctx.db)
            .await?
        {
            return Ok(existing);
        }

        let mut model = factory::mock_location_model(0, location_id)
            .into_active_model()
            .reset_all();
        model.location_key = ActiveValue::NotSet;

        Ok(entity::prelude::DimLocation::insert(model)
            .exec_with_returning(&self.ctx.db)
            .await?)
    }

    /// Insert one calendar row per day in `start..=end`, skipping days already present.
    ///
    /// Returns the number of rows inserted.
    pub async fn insert_mock_calendar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, TestError> {
        let existing: Vec<NaiveDate> = entity::prelude::DimDate::find()
            .filter(entity::dim_date::Column::FullDate.between(start, end))
            .all(&self.ctx.db)
            .await?
            .into_iter()
            .map(|row| row.full_date)
            .collect();

        let missing: Vec<entity::dim_date::ActiveModel> = start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| !existing.contains(day))
            .map(|day| factory::mock_date_model(day).into_active_model().reset_all())
            .collect();

        let inserted = missing.len();
        for chunk in missing.chunks(CALENDAR_CHUNK) {
            entity::prelude::DimDate::insert_many(chunk.to_vec())
                .exec(&self.ctx.db)
                .await?;
        }

        Ok(inserted)
    }

    /// Insert a fact row together with every dimension and calendar row it references.
    ///
    /// The calendar is extended to cover the purchase and delivery dates.
    pub async fn insert_mock_fact(
        &self,
        order_id: &str,
        order_item_id: i32,
        customer_id: &str,
        product_id: &str,
        seller_id: &str,
        purchased_at: NaiveDateTime,
    ) -> Result<entity::fact_sales::Model, TestError> {
        let customer = self.insert_mock_customer(customer_id).await?;
        let product = self.insert_mock_product(product_id).await?;
        let seller = self.insert_mock_seller(seller_id).await?;
        let location = self.insert_mock_location("01001|sao paulo|SP").await?;

        let fact = factory::mock_fact_model(
            order_id,
            order_item_id,
            customer.customer_key,
            product.product_key,
            seller.seller_key,
            location.location_key,
            purchased_at,
        );

        let last_day = fact
            .order_delivered_customer_date
            .map(|ts| ts.date())
            .unwrap_or(purchased_at.date());
        self.insert_mock_calendar(purchased_at.date(), last_day)
            .await?;

        Ok(entity::prelude::FactSales::insert(fact.into_active_model().reset_all())
            .exec_with_returning(&self.ctx.db)
            .await?)
    }
}
