//! Test context structure and utilities.
//!
//! This module provides the `TestContext` returned by `TestBuilder` for test execution.
//! The context wraps a SQLite database, in memory unless a file is requested, that the
//! warehouse schema is created in.

use std::path::Path;

use sea_orm::{
    sea_query::TableCreateStatement, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection,
};

/// Pool size of file-backed test databases.
const FILE_POOL_SIZE: u32 = 4;

use crate::error::TestError;

/// Test context structure returned by `TestBuilder`
///
/// ```ignore
/// let test = TestBuilder::new().with_warehouse_tables().build().await?;
///
/// // Access the database
/// let db = &test.db;
///
/// // Access fixture helpers
/// test.warehouse().insert_mock_customer("KH000001").await?;
/// ```
pub struct TestContext {
    /// Database connection to the SQLite test database
    pub db: DatabaseConnection,
}

impl TestContext {
    /// Create a new test context backed by an empty in-memory SQLite database.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Connected test context without any tables
    /// - `Err(TestError::DbErr)` - Database connection failed
    pub async fn new() -> Result<Self, TestError> {
        let db = Database::connect("sqlite::memory:").await?;

        Ok(TestContext { db })
    }

    /// Create a test context backed by a new SQLite file at `path`.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Connected test context with a pool of connections
    /// - `Err(TestError::DbErr)` - The file could not be created or opened
    pub async fn with_file(path: &Path) -> Result<Self, TestError> {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(FILE_POOL_SIZE)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(options).await?;

        Ok(TestContext { db })
    }

    /// Create database tables from schema statements.
    ///
    /// Executes CREATE TABLE statements in order, so parents must come before
    /// tables holding foreign keys to them.
    pub(crate) async fn with_tables(
        &self,
        stmts: Vec<TableCreateStatement>,
    ) -> Result<(), TestError> {
        for stmt in stmts {
            self.db.execute(&stmt).await?;
        }

        Ok(())
    }
}
