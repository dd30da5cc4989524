use chrono::Utc;
use storehouse_test_utils::prelude::*;

use crate::{
    data::dimension::{CustomerRepository, DimensionStore, LocationRepository},
    model::dimension::{CustomerAttributes, LocationAttributes},
};

mod customer;
mod location;
