//! Volume figures of ordered products.

use crate::model::LineItem;
use crate::types::Volumetric;

/// Volume of a single unit of the product.
#[inline]
pub fn unit_volume(product: &LineItem) -> f64 {
    product.volume()
}

/// Volume of the whole ordered quantity.
#[inline]
pub fn total_volume(product: &LineItem) -> f64 {
    unit_volume(product) * f64::from(product.ordered_quantity)
}
