//! Dimension attribute sets.
//!
//! Each dimension row is identified by an immutable natural key and carries
//! mutable descriptive attributes that are overwritten in place on change.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    model::raw::{RawCustomer, RawProduct, RawSeller},
    util::region::{category_l1, region_for_state},
};

/// Placeholder component of a location natural key when the address part is missing.
const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Customer,
    Product,
    Seller,
    Location,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Product => "product",
            Self::Seller => "seller",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavior shared by every dimension attribute set.
pub trait DimensionRow: Clone + PartialEq + fmt::Debug {
    const KIND: DimensionKind;

    fn natural_key(&self) -> &str;

    /// Immutable identity beyond the natural key, if the dimension has one.
    fn identity(&self) -> Option<&str> {
        None
    }

    /// Whether the row was created from a bare reference with no descriptive data.
    ///
    /// A placeholder never overwrites a stored row; a full record may later claim it.
    fn is_placeholder(&self) -> bool {
        false
    }

    /// Takes over the stored identity when this row does not state one.
    fn inherit_identity(&mut self, _stored: &Self) {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAttributes {
    pub customer_id: String,
    pub unique_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code_prefix: Option<String>,
    pub region: Option<String>,
    pub tier: Option<String>,
}

impl CustomerAttributes {
    /// Builds customer attributes from a source record.
    ///
    /// The region is derived from the state when the source omits it. A missing
    /// unique id stays empty so the identity remains unknown.
    pub fn from_raw(raw: &RawCustomer) -> Self {
        let customer_id = raw.customer_id.trim().to_string();
        let region = non_empty(&raw.customer_region).or_else(|| {
            raw.customer_state
                .as_deref()
                .and_then(region_for_state)
                .map(str::to_string)
        });

        Self {
            unique_id: non_empty(&raw.customer_unique_id).unwrap_or_default(),
            customer_id,
            name: non_empty(&raw.customer_name),
            city: non_empty(&raw.customer_city),
            state: non_empty(&raw.customer_state),
            zip_code_prefix: non_empty(&raw.customer_zip_code_prefix),
            region,
            tier: non_empty(&raw.customer_tier),
        }
    }

    /// Attributes for a customer first seen on an order, before its own record arrives.
    ///
    /// The identity is left empty until the customer record claims the row.
    pub fn placeholder(customer_id: &str) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            unique_id: String::new(),
            name: None,
            city: None,
            state: None,
            zip_code_prefix: None,
            region: None,
            tier: None,
        }
    }

    /// The location derived from this customer's address.
    pub fn location(&self) -> LocationAttributes {
        LocationAttributes::new(
            self.zip_code_prefix.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
        )
    }
}

impl DimensionRow for CustomerAttributes {
    const KIND: DimensionKind = DimensionKind::Customer;

    fn natural_key(&self) -> &str {
        &self.customer_id
    }

    fn identity(&self) -> Option<&str> {
        Some(self.unique_id.as_str()).filter(|id| !id.is_empty())
    }

    fn is_placeholder(&self) -> bool {
        *self == Self::placeholder(&self.customer_id)
    }

    fn inherit_identity(&mut self, stored: &Self) {
        if self.unique_id.is_empty() {
            self.unique_id.clone_from(&stored.unique_id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAttributes {
    pub product_id: String,
    pub category_name: Option<String>,
    pub category_l1: Option<String>,
    pub weight_g: Option<f64>,
    pub length_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub width_cm: Option<f64>,
}

impl ProductAttributes {
    pub fn from_raw(raw: &RawProduct) -> Self {
        let category_name = non_empty(&raw.product_category_name);
        Self {
            product_id: raw.product_id.trim().to_string(),
            category_l1: category_name
                .as_deref()
                .and_then(category_l1)
                .map(str::to_string),
            category_name,
            weight_g: raw.product_weight_g,
            length_cm: raw.product_length_cm,
            height_cm: raw.product_height_cm,
            width_cm: raw.product_width_cm,
        }
    }

    pub fn placeholder(product_id: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            category_name: None,
            category_l1: None,
            weight_g: None,
            length_cm: None,
            height_cm: None,
            width_cm: None,
        }
    }

    /// `length * height * width`, when all three are known.
    pub fn volume_cm3(&self) -> Option<f64> {
        Some(self.length_cm? * self.height_cm? * self.width_cm?)
    }

    /// `weight / volume`; 0 when the volume is zero or unknown.
    pub fn density_g_cm3(&self) -> Option<f64> {
        let weight = self.weight_g?;
        match self.volume_cm3() {
            Some(volume) if volume > 0.0 => Some(weight / volume),
            _ => Some(0.0),
        }
    }
}

impl DimensionRow for ProductAttributes {
    const KIND: DimensionKind = DimensionKind::Product;

    fn natural_key(&self) -> &str {
        &self.product_id
    }

    fn is_placeholder(&self) -> bool {
        *self == Self::placeholder(&self.product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerAttributes {
    pub seller_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code_prefix: Option<String>,
    pub region: Option<String>,
}

impl SellerAttributes {
    pub fn from_raw(raw: &RawSeller) -> Self {
        let region = non_empty(&raw.seller_region).or_else(|| {
            raw.seller_state
                .as_deref()
                .and_then(region_for_state)
                .map(str::to_string)
        });

        Self {
            seller_id: raw.seller_id.trim().to_string(),
            name: non_empty(&raw.seller_name),
            city: non_empty(&raw.seller_city),
            state: non_empty(&raw.seller_state),
            zip_code_prefix: non_empty(&raw.seller_zip_code_prefix),
            region,
        }
    }

    pub fn placeholder(seller_id: &str) -> Self {
        Self {
            seller_id: seller_id.to_string(),
            name: None,
            city: None,
            state: None,
            zip_code_prefix: None,
            region: None,
        }
    }

    pub fn location(&self) -> LocationAttributes {
        LocationAttributes::new(
            self.zip_code_prefix.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
        )
    }
}

impl DimensionRow for SellerAttributes {
    const KIND: DimensionKind = DimensionKind::Seller;

    fn natural_key(&self) -> &str {
        &self.seller_id
    }

    fn is_placeholder(&self) -> bool {
        *self == Self::placeholder(&self.seller_id)
    }
}

/// A location keyed by its normalized `zip|city|state` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAttributes {
    pub location_id: String,
    pub zip_code_prefix: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
}

impl LocationAttributes {
    pub fn new(zip_code_prefix: Option<&str>, city: Option<&str>, state: Option<&str>) -> Self {
        let zip_code_prefix = normalized(zip_code_prefix, |s| s.to_string());
        let city = normalized(city, str::to_lowercase);
        let state = normalized(state, str::to_uppercase);

        let location_id = format!(
            "{}|{}|{}",
            zip_code_prefix.as_deref().unwrap_or(UNKNOWN),
            city.as_deref().unwrap_or(UNKNOWN),
            state.as_deref().unwrap_or(UNKNOWN),
        );

        Self {
            location_id,
            region: state
                .as_deref()
                .and_then(region_for_state)
                .map(str::to_string),
            zip_code_prefix,
            city,
            state,
        }
    }
}

impl DimensionRow for LocationAttributes {
    const KIND: DimensionKind = DimensionKind::Location;

    fn natural_key(&self) -> &str {
        &self.location_id
    }
}

/// Attributes of any dimension; the variant names the dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DimensionAttributes {
    Customer(CustomerAttributes),
    Product(ProductAttributes),
    Seller(SellerAttributes),
    Location(LocationAttributes),
}

impl DimensionAttributes {
    pub fn kind(&self) -> DimensionKind {
        match self {
            Self::Customer(_) => DimensionKind::Customer,
            Self::Product(_) => DimensionKind::Product,
            Self::Seller(_) => DimensionKind::Seller,
            Self::Location(_) => DimensionKind::Location,
        }
    }

    pub fn natural_key(&self) -> &str {
        match self {
            Self::Customer(attrs) => attrs.natural_key(),
            Self::Product(attrs) => attrs.natural_key(),
            Self::Seller(attrs) => attrs.natural_key(),
            Self::Location(attrs) => attrs.natural_key(),
        }
    }
}

/// A dimension row as persisted in the warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDimension<A> {
    pub surrogate_key: i32,
    pub is_active: bool,
    pub attributes: A,
    pub created_date: NaiveDateTime,
    pub updated_date: NaiveDateTime,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn normalized(value: Option<&str>, f: impl Fn(&str) -> String) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_region_derived_from_state() {
        let raw = RawCustomer {
            customer_id: " KH000001 ".to_string(),
            customer_state: Some("RJ".to_string()),
            ..Default::default()
        };

        let attrs = CustomerAttributes::from_raw(&raw);
        assert_eq!(attrs.customer_id, "KH000001");
        assert_eq!(attrs.identity(), None);
        assert!(!attrs.is_placeholder());
        assert_eq!(attrs.region.as_deref(), Some("Southeast"));
    }

    #[test]
    fn product_volume_and_density() {
        let raw = RawProduct {
            product_id: "SP1".to_string(),
            product_category_name: Some("electronics".to_string()),
            product_weight_g: Some(800.0),
            product_length_cm: Some(10.0),
            product_height_cm: Some(4.0),
            product_width_cm: Some(5.0),
        };
        let attrs = ProductAttributes::from_raw(&raw);

        assert_eq!(attrs.category_l1.as_deref(), Some("Electronics"));
        assert_eq!(attrs.volume_cm3(), Some(200.0));
        assert_eq!(attrs.density_g_cm3(), Some(4.0));

        let flat = ProductAttributes {
            height_cm: Some(0.0),
            ..attrs
        };
        assert_eq!(flat.density_g_cm3(), Some(0.0));
    }

    #[test]
    fn location_key_is_normalized() {
        let location = LocationAttributes::new(Some("01001"), Some(" Sao Paulo"), Some("sp"));
        assert_eq!(location.location_id, "01001|sao paulo|SP");
        assert_eq!(location.region.as_deref(), Some("Southeast"));

        let partial = LocationAttributes::new(None, Some("Recife"), Some(""));
        assert_eq!(partial.location_id, "unknown|recife|unknown");
    }
}
