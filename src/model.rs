//! Data models for order packing.
//!
//! This module defines the input and output records of the packer:
//! - `ContainerSpec`: A named container type from the catalog
//! - `LineItem` / `OrderRequest`: What the customer ordered
//! - `ContainerAssignment` / `ShipmentRecord`: Which containers were dispatched
//!
//! The serde layout matches the JSON wire shape (camelCase field names).

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::error::PackError;
use crate::types::{Dimensions, Volumetric};

/// A container type offered by the catalog.
///
/// # Fields
/// * `container_type` - Name of the type, e.g. "Cardboard A"
/// * `dimensions` - Inner dimensions of the container
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "containerType": "Cardboard A",
    "dimensions": {"unit": "centimeter", "length": 30.0, "width": 30.0, "height": 30.0}
}))]
pub struct ContainerSpec {
    pub container_type: String,
    pub dimensions: Dimensions,
}

impl ContainerSpec {
    /// Creates a new container spec after validating its dimensions.
    ///
    /// # Examples
    /// ```
    /// use order_packer::model::ContainerSpec;
    /// use order_packer::types::Dimensions;
    ///
    /// let ok = ContainerSpec::new("Cardboard B", Dimensions::new("centimeter", 10.0, 20.0, 20.0));
    /// assert!(ok.is_ok());
    ///
    /// let broken = ContainerSpec::new("Broken", Dimensions::new("centimeter", -1.0, 20.0, 20.0));
    /// assert!(broken.is_err());
    /// ```
    pub fn new(container_type: impl Into<String>, dimensions: Dimensions) -> Result<Self, PackError> {
        let spec = Self {
            container_type: container_type.into(),
            dimensions,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the dimensions of an already constructed spec.
    pub fn validate(&self) -> Result<(), PackError> {
        self.dimensions.validate(&self.container_type)
    }
}

impl Volumetric for ContainerSpec {
    fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }
}

/// One ordered product.
///
/// `unit_price` is carried through untouched; packing never looks at it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "PRODUCT-001",
    "name": "GOOD FORTUNE COOKIES",
    "orderedQuantity": 9,
    "dimensions": {"unit": "centimeter", "length": 10.0, "width": 10.0, "height": 30.0},
    "unitPrice": 13.4
}))]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub ordered_quantity: u32,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub unit_price: f64,
}

impl LineItem {
    /// Creates a line item without a price.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        ordered_quantity: u32,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ordered_quantity,
            dimensions,
            unit_price: 0.0,
        }
    }

    /// Sets the unit price (Builder pattern light).
    pub fn with_unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// Rejects broken dimensions and a zero quantity.
    pub fn validate(&self) -> Result<(), PackError> {
        self.dimensions.validate(&self.id)?;
        if self.ordered_quantity == 0 {
            return Err(PackError::InvalidQuantity {
                product_id: self.id.clone(),
                quantity: self.ordered_quantity,
            });
        }
        Ok(())
    }
}

impl Volumetric for LineItem {
    fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }
}

/// A customer order: an id and its line items in order of appearance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "ORDER-001",
    "products": [{
        "id": "PRODUCT-001",
        "name": "GOOD FORTUNE COOKIES",
        "orderedQuantity": 9,
        "dimensions": {"unit": "centimeter", "length": 10.0, "width": 10.0, "height": 30.0},
        "unitPrice": 13.4
    }]
}))]
pub struct OrderRequest {
    pub id: String,
    #[serde(default)]
    pub products: Vec<LineItem>,
}

impl OrderRequest {
    pub fn new(id: impl Into<String>, products: Vec<LineItem>) -> Self {
        Self {
            id: id.into(),
            products,
        }
    }
}

/// Units of one product inside a dispatched container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContainingProduct {
    #[serde(rename = "id")]
    pub product_id: String,
    pub quantity: u32,
}

/// One physical container dispatched for the order.
///
/// The same `container_type` may appear several times in a shipment,
/// each entry being a distinct container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerAssignment {
    pub container_type: String,
    pub containing_products: Vec<ContainingProduct>,
}

impl ContainerAssignment {
    /// A container holding `quantity` units of a single product.
    pub fn single(
        container_type: impl Into<String>,
        product_id: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            container_type: container_type.into(),
            containing_products: vec![ContainingProduct {
                product_id: product_id.into(),
                quantity,
            }],
        }
    }

    /// Units of `product_id` held by this container.
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.containing_products
            .iter()
            .filter(|p| p.product_id == product_id)
            .map(|p| p.quantity)
            .sum()
    }
}

/// Volume figure with its unit label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TotalVolume {
    pub unit: String,
    pub value: f64,
}

/// Result of packing one order.
///
/// `total_volume` is the summed nominal capacity of every dispatched container,
/// not the volume the goods actually occupy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub order_id: String,
    pub total_volume: TotalVolume,
    pub containers: Vec<ContainerAssignment>,
}

impl ShipmentRecord {
    /// Number of dispatched containers.
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// Units of `product_id` across all dispatched containers.
    pub fn quantity_for(&self, product_id: &str) -> u32 {
        self.containers
            .iter()
            .map(|c| c.quantity_of(product_id))
            .sum()
    }
}
