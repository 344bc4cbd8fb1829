//! Common types and traits for volume calculations.
//!
//! Every order and catalog is expressed in one linear unit. No conversion
//! happens anywhere: a volume is simply the product of the three lengths,
//! reported in the cubic form of that unit.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::error::PackError;

/// Unit label attached to reported volumes when nothing else is configured.
pub const DEFAULT_VOLUME_UNIT: &str = "cubic centimeter";

/// Extent of a rectangular prism.
///
/// # Examples
/// ```
/// use order_packer::types::Dimensions;
///
/// let dims = Dimensions::new("centimeter", 10.0, 20.0, 20.0);
/// assert_eq!(dims.volume(), 4000.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"unit": "centimeter", "length": 30.0, "width": 30.0, "height": 30.0}))]
pub struct Dimensions {
    pub unit: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Creates new dimensions without validating them.
    pub fn new(unit: impl Into<String>, length: f64, width: f64, height: f64) -> Self {
        Self {
            unit: unit.into(),
            length,
            width,
            height,
        }
    }

    /// length × width × height.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Checks if all three lengths are positive and finite.
    #[inline]
    pub fn is_valid(&self) -> bool {
        validation::validate_dimensions_3d(self).is_ok()
    }

    /// Validates the dimensions, naming `subject` in the error.
    ///
    /// # Parameters
    /// * `subject` - What the dimensions belong to (container type or product id)
    pub fn validate(&self, subject: &str) -> Result<(), PackError> {
        validation::validate_dimensions_3d(self).map_err(|detail| PackError::InvalidDimensions {
            subject: subject.to_string(),
            detail,
        })
    }
}

/// Volume of a rectangular prism, failing on a non-positive dimension.
///
/// # Examples
/// ```
/// use order_packer::types::{volume, Dimensions};
///
/// let ok = volume(&Dimensions::new("centimeter", 30.0, 30.0, 30.0));
/// assert_eq!(ok.unwrap(), 27000.0);
///
/// let broken = volume(&Dimensions::new("centimeter", 0.0, 30.0, 30.0));
/// assert!(broken.is_err());
/// ```
pub fn volume(dimensions: &Dimensions) -> Result<f64, PackError> {
    dimensions.validate("dimensions")?;
    Ok(dimensions.volume())
}

/// Trait for anything occupying or offering a rectangular volume.
pub trait Volumetric {
    /// Returns the dimensions of the object.
    fn dimensions(&self) -> &Dimensions;

    /// Calculates the volume.
    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }
}

impl Volumetric for Dimensions {
    fn dimensions(&self) -> &Dimensions {
        self
    }
}

/// Validation functions shared by catalog entries and line items.
pub mod validation {
    use super::Dimensions;

    /// Validates a single dimension.
    ///
    /// # Returns
    /// `Ok(())` for valid values, otherwise error text
    pub fn validate_dimension(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }

    /// Validates all three lengths of a prism.
    pub fn validate_dimensions_3d(dims: &Dimensions) -> Result<(), String> {
        validate_dimension(dims.length, "Length")?;
        validate_dimension(dims.width, "Width")?;
        validate_dimension(dims.height, "Height")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_is_product_of_lengths() {
        let dims = Dimensions::new("centimeter", 10.0, 10.0, 30.0);
        assert_eq!(dims.volume(), 3000.0);
        assert_eq!(volume(&dims).unwrap(), 3000.0);
    }

    #[test]
    fn test_volume_rejects_non_positive_dimension() {
        let dims = Dimensions::new("centimeter", 10.0, -1.0, 30.0);
        match volume(&dims) {
            Err(PackError::InvalidDimensions { detail, .. }) => {
                assert!(detail.contains("Width"));
            }
            other => panic!("expected InvalidDimensions, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_names_subject() {
        let dims = Dimensions::new("centimeter", 10.0, 10.0, 0.0);
        let err = dims.validate("Cardboard A").unwrap_err();
        assert!(err.to_string().contains("Cardboard A"));
        assert!(!dims.is_valid());
    }

    #[test]
    fn test_validation_dimension() {
        assert!(validation::validate_dimension(10.0, "Length").is_ok());
        assert!(validation::validate_dimension(0.0, "Length").is_err());
        assert!(validation::validate_dimension(-1.0, "Length").is_err());
        assert!(validation::validate_dimension(f64::NAN, "Length").is_err());
        assert!(validation::validate_dimension(f64::INFINITY, "Length").is_err());
    }

    #[test]
    fn test_dimensions_deserialize_from_wire_shape() {
        let json = r#"{"unit": "centimeter", "length": 30, "width": 30, "height": 25}"#;
        let dims: Dimensions = serde_json::from_str(json).expect("Should parse dimensions");
        assert_eq!(dims.unit, "centimeter");
        assert_eq!(dims.volume(), 22500.0);
    }
}
