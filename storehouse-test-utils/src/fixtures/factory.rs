//! Factory functions for generating mock warehouse models.
//!
//! Provides pure functions for creating dimension and fact models with standard
//! test values. These are in-memory model instances that don't require database
//! interaction.

use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Create a mock customer dimension model.
///
/// The unique id is derived from the natural key so repeated calls for the same
/// customer agree on identity.
pub fn mock_customer_model(customer_key: i32, customer_id: &str) -> entity::dim_customer::Model {
    let now = Utc::now().naive_utc();
    entity::dim_customer::Model {
        customer_key,
        customer_id: customer_id.to_string(),
        customer_unique_id: format!("unique-{customer_id}"),
        customer_name: Some("Test Customer".to_string()),
        customer_city: Some("sao paulo".to_string()),
        customer_state: Some("SP".to_string()),
        customer_zip_code_prefix: Some("01001".to_string()),
        customer_region: Some("Southeast".to_string()),
        customer_tier: Some("Silver".to_string()),
        is_active: true,
        created_date: now,
        updated_date: now,
    }
}

/// Create a mock product dimension model.
pub fn mock_product_model(product_key: i32, product_id: &str) -> entity::dim_product::Model {
    let now = Utc::now().naive_utc();
    entity::dim_product::Model {
        product_key,
        product_id: product_id.to_string(),
        product_category_name: Some("informatica_acessorios".to_string()),
        product_category_l1: Some("Electronics".to_string()),
        product_weight_g: Some(500.0),
        product_length_cm: Some(10.0),
        product_height_cm: Some(10.0),
        product_width_cm: Some(10.0),
        product_volume_cm3: Some(1000.0),
        product_density_g_cm3: Some(0.5),
        is_active: true,
        created_date: now,
        updated_date: now,
    }
}

/// Create a mock seller dimension model.
pub fn mock_seller_model(seller_key: i32, seller_id: &str) -> entity::dim_seller::Model {
    let now = Utc::now().naive_utc();
    entity::dim_seller::Model {
        seller_key,
        seller_id: seller_id.to_string(),
        seller_name: Some("Test Seller".to_string()),
        seller_city: Some("curitiba".to_string()),
        seller_state: Some("PR".to_string()),
        seller_zip_code_prefix: Some("80010".to_string()),
        seller_region: Some("South".to_string()),
        is_active: true,
        created_date: now,
        updated_date: now,
    }
}

/// Create a mock location dimension model.
///
/// `location_id` is split on `|` into zip, city and state when it has that shape.
pub fn mock_location_model(location_key: i32, location_id: &str) -> entity::dim_location::Model {
    let now = Utc::now().naive_utc();
    let mut parts = location_id.splitn(3, '|').map(str::to_string);
    entity::dim_location::Model {
        location_key,
        location_id: location_id.to_string(),
        zip_code_prefix: parts.next(),
        city: parts.next(),
        state: parts.next(),
        region: None,
        is_active: true,
        created_date: now,
        updated_date: now,
    }
}

/// Create a mock calendar row for `date`.
///
/// Seasons follow the northern hemisphere table.
pub fn mock_date_model(date: NaiveDate) -> entity::dim_date::Model {
    use chrono::Datelike;

    let month = date.month() as i32;
    let (fiscal_quarter, fiscal_year) = match month {
        1..=3 => (4, date.year()),
        4..=6 => (1, date.year() + 1),
        7..=9 => (2, date.year() + 1),
        _ => (3, date.year() + 1),
    };
    let season = match month {
        12 | 1 | 2 => "Winter",
        3..=5 => "Spring",
        6..=8 => "Summer",
        _ => "Autumn",
    };

    entity::dim_date::Model {
        date_key: date.year() * 10_000 + month * 100 + date.day() as i32,
        full_date: date,
        day_of_week: date.weekday().number_from_monday() as i32,
        day_name: date.format("%A").to_string(),
        day_of_month: date.day() as i32,
        day_of_year: date.ordinal() as i32,
        week_of_year: date.iso_week().week() as i32,
        month,
        month_name: date.format("%B").to_string(),
        quarter: (month - 1) / 3 + 1,
        year: date.year(),
        is_weekend: date.weekday().number_from_monday() >= 6,
        is_holiday: false,
        season: season.to_string(),
        fiscal_quarter,
        fiscal_year,
    }
}

/// Create a mock sales fact model referencing the given surrogate keys.
///
/// Price 100.0 and freight 10.0; the order was delivered one day ahead of the
/// estimate.
pub fn mock_fact_model(
    order_id: &str,
    order_item_id: i32,
    customer_key: i32,
    product_key: i32,
    seller_key: i32,
    location_key: i32,
    purchased_at: NaiveDateTime,
) -> entity::fact_sales::Model {
    use chrono::{Datelike, Duration};

    let now = Utc::now().naive_utc();
    let delivered = purchased_at + Duration::days(5);
    let estimated = purchased_at + Duration::days(6);
    let date_key = |ts: NaiveDateTime| {
        ts.date().year() * 10_000 + ts.date().month() as i32 * 100 + ts.date().day() as i32
    };

    entity::fact_sales::Model {
        order_id: order_id.to_string(),
        order_item_id,
        customer_key,
        product_key,
        seller_key,
        location_key,
        order_date_key: date_key(purchased_at),
        delivery_date_key: Some(date_key(delivered)),
        order_status: "delivered".to_string(),
        price: 100.0,
        freight_value: 10.0,
        total_value: 110.0,
        payment_installments: 1,
        order_purchase_timestamp: purchased_at,
        order_approved_at: Some(purchased_at + Duration::hours(2)),
        order_delivered_carrier_date: Some(purchased_at + Duration::days(1)),
        order_delivered_customer_date: Some(delivered),
        order_estimated_delivery_date: Some(estimated),
        delivery_delay_days: Some(-1),
        processing_time_hours: Some(2),
        is_delivered_ontime: Some(true),
        is_fast_delivery: Some(true),
        created_date: now,
        updated_date: now,
    }
}
