//! Sheets shipped with the crate.

use super::SheetSchema;
use crate::error::SheetError;

pub const REVIEWS: &str = "reviews";
pub const PRODUCTS: &str = "products";

const REVIEWS_JSON: &str = include_str!("sheets/reviews.json");
const PRODUCTS_JSON: &str = include_str!("sheets/products.json");

pub fn reviews() -> Result<SheetSchema, SheetError> {
    SheetSchema::from_json(REVIEWS_JSON)
}

pub fn products() -> Result<SheetSchema, SheetError> {
    SheetSchema::from_json(PRODUCTS_JSON)
}

/// Look up a built-in sheet by name.
pub fn by_name(name: &str) -> Result<SheetSchema, SheetError> {
    match name {
        REVIEWS => reviews(),
        PRODUCTS => products(),
        other => Err(SheetError::UnknownSheet(other.to_string())),
    }
}
