//! Extraction of raw source records.
//!
//! Transactional extracts arrive as CSV files in one directory; ML artifacts
//! arrive as JSON-lines files, one prediction per line.

pub mod csv_file;
pub mod jsonl;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{
    error::Error,
    model::{
        quarantine::QuarantineEntry,
        raw::{RawCustomer, RawOrder, RawOrderItem, RawPayment, RawProduct, RawSeller},
    },
};

pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const SELLERS_FILE: &str = "sellers.csv";
pub const PRODUCTS_FILE: &str = "products.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const ORDER_ITEMS_FILE: &str = "order_items.csv";
pub const PAYMENTS_FILE: &str = "order_payments.csv";

/// One batch of raw records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBatch {
    pub customers: Vec<RawCustomer>,
    pub sellers: Vec<RawSeller>,
    pub products: Vec<RawProduct>,
    pub orders: Vec<RawOrder>,
    pub order_items: Vec<RawOrderItem>,
    pub payments: Vec<RawPayment>,
    /// Records of any file that could not be parsed.
    pub malformed: Vec<QuarantineEntry>,
}

impl SourceBatch {
    /// Reads every known extract in `dir`; missing files are logged and skipped.
    ///
    /// # Returns
    /// - `Ok(SourceBatch)` - Records of every file found; unparseable records are
    ///   collected in `malformed`
    /// - `Err(Error::CsvError)` - A file exists but could not be read
    pub fn from_dir(dir: &Path) -> Result<Self, Error> {
        let mut malformed = Vec::new();
        let batch = Self {
            customers: read(dir, CUSTOMERS_FILE, &mut malformed)?,
            sellers: read(dir, SELLERS_FILE, &mut malformed)?,
            products: read(dir, PRODUCTS_FILE, &mut malformed)?,
            orders: read(dir, ORDERS_FILE, &mut malformed)?,
            order_items: read(dir, ORDER_ITEMS_FILE, &mut malformed)?,
            payments: read(dir, PAYMENTS_FILE, &mut malformed)?,
            malformed,
        };

        tracing::info!(
            "Extracted {} customers, {} sellers, {} products, {} orders, {} order items, {} payments ({} malformed) from {}",
            batch.customers.len(),
            batch.sellers.len(),
            batch.products.len(),
            batch.orders.len(),
            batch.order_items.len(),
            batch.payments.len(),
            batch.malformed.len(),
            dir.display()
        );

        Ok(batch)
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
            && self.sellers.is_empty()
            && self.products.is_empty()
            && self.orders.is_empty()
            && self.order_items.is_empty()
    }
}

fn read<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
    malformed: &mut Vec<QuarantineEntry>,
) -> Result<Vec<T>, Error> {
    let extract = csv_file::read_optional(&dir.join(file))?;
    malformed.extend(extract.malformed);

    Ok(extract.records)
}
