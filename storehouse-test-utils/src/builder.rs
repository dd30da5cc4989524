//! Declarative test builder.
//!
//! This module provides the `TestBuilder` API for configuring test environments before execution.
//! The builder pattern allows chaining multiple configuration methods together, with all operations
//! queued and executed during the final `build()` call.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{error::TestError, TestContext};

/// Builder for declarative test initialization.
///
/// Provides an interface for setting up test environments with warehouse tables and
/// dimension fixtures. Methods can be chained together and finalized with `build()`.
pub struct TestBuilder {
    // File-backed database; in-memory when unset
    database_file: Option<PathBuf>,

    // Tables to create
    tables: Vec<TableCreateStatement>,
    include_warehouse_tables: bool,

    // Database fixtures to insert
    calendar: Vec<(NaiveDate, NaiveDate)>,
    customers: Vec<String>,
    products: Vec<String>,
    sellers: Vec<String>,
    locations: Vec<String>,
}

impl TestBuilder {
    /// Create a new TestBuilder.
    ///
    /// Initializes an empty builder with no tables or fixtures configured.
    pub fn new() -> Self {
        Self {
            database_file: None,
            tables: Vec::new(),
            include_warehouse_tables: false,
            calendar: Vec::new(),
            customers: Vec::new(),
            products: Vec::new(),
            sellers: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// Back the test database by a SQLite file with a pool of several connections.
    ///
    /// The in-memory default serializes every statement on one connection; a file
    /// lets concurrent tasks interleave their transactions. The caller owns the
    /// file's directory and must keep it alive for the test.
    pub fn with_database_file(mut self, path: impl AsRef<Path>) -> Self {
        self.database_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add every warehouse table to the test database.
    ///
    /// Tables are created parents first: the date and dimension tables, then the
    /// sales fact, ML result tables, and finally the run and quarantine tables.
    pub fn with_warehouse_tables(mut self) -> Self {
        self.include_warehouse_tables = true;
        self
    }

    /// Add a custom entity table to the test database.
    ///
    /// Generates a CREATE TABLE statement for the entity, which will be executed during `build()`.
    /// Chain multiple calls to add multiple tables.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use storehouse_test_utils::TestBuilder;
    /// use entity::prelude::*;
    ///
    /// # async fn example() -> Result<(), storehouse_test_utils::TestError> {
    /// let test = TestBuilder::new()
    ///     .with_table(DimCustomer)
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Insert one calendar row per day between `start` and `end` inclusive.
    pub fn with_mock_calendar(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.calendar.push((start, end));
        self
    }

    /// Insert a mock customer dimension row with the provided natural key.
    pub fn with_mock_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customers.push(customer_id.into());
        self
    }

    /// Insert a mock product dimension row with the provided natural key.
    pub fn with_mock_product(mut self, product_id: impl Into<String>) -> Self {
        self.products.push(product_id.into());
        self
    }

    /// Insert a mock seller dimension row with the provided natural key.
    pub fn with_mock_seller(mut self, seller_id: impl Into<String>) -> Self {
        self.sellers.push(seller_id.into());
        self
    }

    /// Insert a mock location dimension row with the provided natural key.
    pub fn with_mock_location(mut self, location_id: impl Into<String>) -> Self {
        self.locations.push(location_id.into());
        self
    }

    /// Build the test context by creating all configured tables and fixtures.
    ///
    /// Executes all queued operations in the following order:
    /// 1. Creates database tables (warehouse tables if specified, then custom tables)
    /// 2. Inserts database fixtures (calendar, customers, products, sellers, locations)
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Fully configured test environment ready for use
    /// - `Err(TestError::DbErr)` - Database table creation or fixture insertion failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let setup = match &self.database_file {
            Some(path) => TestContext::with_file(path).await?,
            None => TestContext::new().await?,
        };

        // 1. Create tables
        let mut all_tables = Vec::new();

        if self.include_warehouse_tables {
            let schema = Schema::new(sea_orm::DbBackend::Sqlite);
            all_tables.extend(vec![
                schema.create_table_from_entity(entity::prelude::DimDate),
                schema.create_table_from_entity(entity::prelude::DimCustomer),
                schema.create_table_from_entity(entity::prelude::DimProduct),
                schema.create_table_from_entity(entity::prelude::DimSeller),
                schema.create_table_from_entity(entity::prelude::DimLocation),
                schema.create_table_from_entity(entity::prelude::FactSales),
                schema.create_table_from_entity(entity::prelude::MlCustomerSegment),
                schema.create_table_from_entity(entity::prelude::MlChurnPrediction),
                schema.create_table_from_entity(entity::prelude::MlCustomerLifetimeValue),
                schema.create_table_from_entity(entity::prelude::MlMarketBasketRule),
                schema.create_table_from_entity(entity::prelude::EtlRun),
                schema.create_table_from_entity(entity::prelude::EtlQuarantine),
            ]);
        }

        all_tables.extend(self.tables);
        setup.with_tables(all_tables).await?;

        // 2. Insert database fixtures
        for (start, end) in self.calendar {
            setup.warehouse().insert_mock_calendar(start, end).await?;
        }

        for customer_id in self.customers {
            setup.warehouse().insert_mock_customer(&customer_id).await?;
        }

        for product_id in self.products {
            setup.warehouse().insert_mock_product(&product_id).await?;
        }

        for seller_id in self.sellers {
            setup.warehouse().insert_mock_seller(&seller_id).await?;
        }

        for location_id in self.locations {
            setup.warehouse().insert_mock_location(&location_id).await?;
        }

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::{EntityTrait, PaginatorTrait};

    use super::*;

    #[tokio::test]
    async fn test_builder_creates_warehouse_tables() {
        let result = TestBuilder::new().with_warehouse_tables().build().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_builder_chains_methods() -> Result<(), TestError> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 1, 31).unwrap();

        let test = TestBuilder::new()
            .with_warehouse_tables()
            .with_mock_calendar(start, end)
            .with_mock_customer("KH000001")
            .with_mock_product("SP000001")
            .build()
            .await?;

        let days = entity::prelude::DimDate::find().count(&test.db).await?;
        assert_eq!(days, 31);

        let customers = entity::prelude::DimCustomer::find().count(&test.db).await?;
        assert_eq!(customers, 1);

        Ok(())
    }
}
