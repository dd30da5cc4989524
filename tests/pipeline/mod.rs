//! End-to-end tests for BatchPipeline over CSV extracts.

mod concurrency;
mod extracts;
mod invariants;

use std::{fs, path::Path, time::Duration};

use chrono::NaiveDate;
use storehouse::{
    config::{CalendarConfig, DimensionPolicy, RetryConfig, WarehouseConfig},
    model::calendar::SeasonTable,
};

pub fn config(policy: DimensionPolicy) -> WarehouseConfig {
    WarehouseConfig {
        calendar: CalendarConfig {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2022, 3, 31).unwrap(),
            seasons: SeasonTable::Southern,
        },
        dimension_policy: policy,
        load_retry: RetryConfig {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
        },
    }
}

/// Writes one extract file per `(name, contents)` pair.
pub fn write_extracts(dir: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        fs::write(dir.join(name), contents).expect("write extract");
    }
}

pub const CUSTOMERS: &str = "\
customer_id,customer_unique_id,customer_city,customer_state,customer_zip_code_prefix
KH1,U1,sao paulo,SP,01001
KH2,U2,rio de janeiro,RJ,20010
";

pub const SELLERS: &str = "\
seller_id,seller_city,seller_state,seller_zip_code_prefix
NB1,curitiba,PR,80010
";

pub const PRODUCTS: &str = "\
product_id,product_category_name,product_weight_g,product_length_cm,product_height_cm,product_width_cm
SP1,electronics,500,10,10,10
SP2,furniture,,,,
";

pub const ORDERS: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date
DH1,KH1,delivered,2022-01-10 09:00:00,2022-01-10 11:30:00,2022-01-11 08:00:00,2022-01-14 16:00:00,2022-01-20 00:00:00
DH2,KH2,shipped,2022-02-01 12:00:00,2022-02-01 13:00:00,,,2022-02-10 00:00:00
DH3,KH404,delivered,2022-02-03 12:00:00,,,,
";

pub const ORDER_ITEMS: &str = "\
order_id,order_item_id,product_id,seller_id,price,freight_value
DH1,1,SP1,NB1,100.0,12.5
DH1,2,SP2,NB1,40.0,0.0
DH2,1,SP1,NB1,100.0,8.0
DH3,1,SP2,NB1,15.0,3.0
";

pub const PAYMENTS: &str = "\
order_id,payment_sequential,payment_type,payment_installments,payment_value
DH1,1,credit_card,4,100.0
DH1,2,voucher,1,52.5
";

pub fn all_extracts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("customers.csv", CUSTOMERS),
        ("sellers.csv", SELLERS),
        ("products.csv", PRODUCTS),
        ("orders.csv", ORDERS),
        ("order_items.csv", ORDER_ITEMS),
        ("order_payments.csv", PAYMENTS),
    ]
}
