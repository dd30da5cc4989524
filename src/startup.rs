use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::{config::Config, error::Error};

/// Connect to the database and run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, Error> {
    let db = connect(config).await?;

    Migrator::up(&db, None).await?;
    tracing::info!("Warehouse schema is up to date");

    Ok(db)
}

/// Connect to the database without touching the schema
pub async fn connect(config: &Config) -> Result<DatabaseConnection, Error> {
    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    Ok(Database::connect(opt).await?)
}
