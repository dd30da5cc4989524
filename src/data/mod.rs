//! Repositories over the warehouse tables.
//!
//! Every repository wraps a borrowed `ConnectionTrait`, so the same code runs
//! against a pooled connection or inside a transaction. Repositories return
//! `DbErr`; services translate failures into domain errors.

pub mod calendar;
pub mod dimension;
pub mod fact;
pub mod ml;
pub mod quarantine;
pub mod run;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

use crate::error::{warehouse::WarehouseError, Error};

/// Maximum number of bound values used for a single `IN (...)` filter.
pub(crate) const LOOKUP_CHUNK: usize = 500;

/// Checks that every warehouse table exists and decodes into its entity model.
///
/// # Returns
/// - `Ok(())` - All tables are usable
/// - `Err(Error::WarehouseError(SchemaMismatch))` - A table is missing or has an incompatible shape
/// - `Err(Error::DbErr)` - The database could not be reached
pub async fn verify_schema<C: ConnectionTrait>(db: &C) -> Result<(), Error> {
    probe::<entity::prelude::DimDate, C>(db).await?;
    probe::<entity::prelude::DimCustomer, C>(db).await?;
    probe::<entity::prelude::DimProduct, C>(db).await?;
    probe::<entity::prelude::DimSeller, C>(db).await?;
    probe::<entity::prelude::DimLocation, C>(db).await?;
    probe::<entity::prelude::FactSales, C>(db).await?;
    probe::<entity::prelude::MlCustomerSegment, C>(db).await?;
    probe::<entity::prelude::MlChurnPrediction, C>(db).await?;
    probe::<entity::prelude::MlCustomerLifetimeValue, C>(db).await?;
    probe::<entity::prelude::MlMarketBasketRule, C>(db).await?;
    probe::<entity::prelude::EtlRun, C>(db).await?;
    probe::<entity::prelude::EtlQuarantine, C>(db).await?;

    Ok(())
}

async fn probe<E: EntityTrait, C: ConnectionTrait>(db: &C) -> Result<(), Error> {
    match E::find().one(db).await {
        Ok(_) => Ok(()),
        Err(err @ (DbErr::Conn(_) | DbErr::ConnectionAcquire(_))) => Err(err.into()),
        Err(err) => Err(WarehouseError::SchemaMismatch(format!(
            "table {} is unusable: {err}",
            E::default().table_name()
        ))
        .into()),
    }
}
