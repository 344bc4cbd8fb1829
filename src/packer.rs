//! Allocation of order line items to catalog containers.
//!
//! The packer works on volume alone. For every product, in order of
//! appearance, it:
//! - ships the whole quantity in the first catalog entry that can hold it,
//! - otherwise fills one instance of every entry that takes at least one unit,
//! - and finally dispatches more instances of the product's first container
//!   type until the ordered quantity is covered.
//!
//! A single synchronous call either returns a complete shipment or fails;
//! nothing is shared between calls besides the read-only catalog.

use log::{debug, warn};

use crate::catalog::ContainerCatalog;
use crate::error::PackError;
use crate::model::{
    ContainerAssignment, ContainerSpec, LineItem, OrderRequest, ShipmentRecord, TotalVolume,
};
use crate::product::{total_volume, unit_volume};
use crate::types::DEFAULT_VOLUME_UNIT;

/// Events emitted while an order is packed, suitable for live streaming.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type")]
pub enum PackEvent {
    /// A container instance was added to the shipment.
    ContainerDispatched {
        index: usize,
        container_type: String,
        product_id: String,
        quantity: u32,
        reused: bool,
    },
    /// The order was refused as a whole.
    OrderRejected {
        code: String,
        reason: String,
        product_ids: Vec<String>,
    },
    /// Packing completed.
    Finished { containers: usize, total_volume: f64 },
}

/// Packs orders against one immutable container catalog.
///
/// # Examples
/// ```
/// use order_packer::catalog::ContainerCatalog;
/// use order_packer::model::{LineItem, OrderRequest};
/// use order_packer::packer::OrderPacker;
/// use order_packer::types::Dimensions;
///
/// let packer = OrderPacker::new(ContainerCatalog::reference_specs()).unwrap();
/// let order = OrderRequest::new(
///     "ORDER-001",
///     vec![LineItem::new("PRODUCT-001", "COOKIES", 9, Dimensions::new("centimeter", 10.0, 10.0, 30.0))],
/// );
/// let shipment = packer.pack(&order).unwrap();
/// assert_eq!(shipment.container_count(), 1);
/// assert_eq!(shipment.total_volume.value, 27000.0);
/// ```
#[derive(Clone, Debug)]
pub struct OrderPacker {
    catalog: ContainerCatalog,
    volume_unit: String,
}

impl OrderPacker {
    /// Creates a packer, failing on a malformed catalog entry.
    pub fn new(specs: Vec<ContainerSpec>) -> Result<Self, PackError> {
        Ok(Self::with_catalog(ContainerCatalog::new(specs)?))
    }

    /// Creates a packer around an already validated catalog.
    pub fn with_catalog(catalog: ContainerCatalog) -> Self {
        Self {
            catalog,
            volume_unit: DEFAULT_VOLUME_UNIT.to_string(),
        }
    }

    /// Sets the label reported with the total volume.
    pub fn with_volume_unit(mut self, unit: impl Into<String>) -> Self {
        self.volume_unit = unit.into();
        self
    }

    pub fn catalog(&self) -> &ContainerCatalog {
        &self.catalog
    }

    pub fn volume_unit(&self) -> &str {
        &self.volume_unit
    }

    /// Packs an order into a shipment record.
    ///
    /// # Returns
    /// The shipment, or `PackError::Infeasible` naming every product that fits
    /// no container type even as a single unit.
    pub fn pack(&self, order: &OrderRequest) -> Result<ShipmentRecord, PackError> {
        self.pack_with_progress(order, |_| {})
    }

    /// Like `pack`, calling `on_event` for every dispatched container.
    pub fn pack_with_progress(
        &self,
        order: &OrderRequest,
        mut on_event: impl FnMut(&PackEvent),
    ) -> Result<ShipmentRecord, PackError> {
        match self.pack_inner(order, &mut on_event) {
            Ok(record) => {
                on_event(&PackEvent::Finished {
                    containers: record.container_count(),
                    total_volume: record.total_volume.value,
                });
                Ok(record)
            }
            Err(err) => {
                on_event(&PackEvent::OrderRejected {
                    code: err.code().to_string(),
                    reason: err.to_string(),
                    product_ids: err.offending_products().to_vec(),
                });
                Err(err)
            }
        }
    }

    fn pack_inner(
        &self,
        order: &OrderRequest,
        on_event: &mut impl FnMut(&PackEvent),
    ) -> Result<ShipmentRecord, PackError> {
        for product in &order.products {
            product.validate()?;
        }
        self.check_feasibility(order)?;

        let mut containers: Vec<ContainerAssignment> = Vec::new();
        for product in &order.products {
            let allocation = self.allocate_product(product)?;
            for (offset, assignment) in allocation.assignments.into_iter().enumerate() {
                let index = containers.len();
                debug!(
                    "📦 {} #{}: {} × {} ({})",
                    order.id,
                    index + 1,
                    assignment.quantity_of(&product.id),
                    product.id,
                    assignment.container_type
                );
                on_event(&PackEvent::ContainerDispatched {
                    index,
                    container_type: assignment.container_type.clone(),
                    product_id: product.id.clone(),
                    quantity: assignment.quantity_of(&product.id),
                    reused: offset >= allocation.first_reused,
                });
                containers.push(assignment);
            }
        }

        let value = self.total_volume(&containers)?;
        Ok(ShipmentRecord {
            order_id: order.id.clone(),
            total_volume: TotalVolume {
                unit: self.volume_unit.clone(),
                value,
            },
            containers,
        })
    }

    /// Rejects the order if any product's unit volume exceeds every catalog capacity.
    ///
    /// Collects all offending product ids before failing.
    pub fn check_feasibility(&self, order: &OrderRequest) -> Result<(), PackError> {
        let capacities = self.catalog.all_volumes();
        let product_ids: Vec<String> = order
            .products
            .iter()
            .filter(|product| {
                let unit = unit_volume(product);
                capacities.iter().all(|c| unit > c.volume)
            })
            .map(|product| product.id.clone())
            .collect();

        if product_ids.is_empty() {
            Ok(())
        } else {
            warn!(
                "⚠️ Order {} can't be packed, oversized product(s): {}",
                order.id,
                product_ids.join(", ")
            );
            Err(PackError::Infeasible { product_ids })
        }
    }

    /// Distributes one product over container instances.
    fn allocate_product(&self, product: &LineItem) -> Result<ProductAllocation, PackError> {
        let ordered = product.ordered_quantity;
        let unit = unit_volume(product);
        let mut allocation = ProductAllocation::default();

        // One container is enough: don't fragment the shipment.
        if let Some(spec) = self
            .catalog
            .containers()
            .iter()
            .find(|spec| can_store_ordered_quantity(self.catalog.volume_of(spec), product))
        {
            allocation.dispatch(&spec.container_type, &product.id, ordered);
            allocation.first_reused = allocation.assignments.len();
            return Ok(allocation);
        }

        for spec in self.catalog.containers() {
            let capacity = self.catalog.volume_of(spec);
            if !can_store_product(capacity, unit) {
                continue;
            }
            let remaining = ordered - allocation.assigned;
            if remaining == 0 {
                continue;
            }
            let quantity = how_many_can_be_stored(capacity, unit).min(remaining);
            allocation.dispatch(&spec.container_type, &product.id, quantity);
        }
        allocation.first_reused = allocation.assignments.len();

        let mut remaining = ordered - allocation.assigned;
        if remaining > 0 {
            let Some(first) = allocation.assignments.first().cloned() else {
                return Err(PackError::Infeasible {
                    product_ids: vec![product.id.clone()],
                });
            };
            let per_instance = first.quantity_of(&product.id);
            debug!(
                "🔁 Catalog exhausted for {}, reusing {} ({} per instance) for {} more unit(s)",
                product.id, first.container_type, per_instance, remaining
            );
            while remaining > 0 {
                let quantity = per_instance.min(remaining);
                allocation.dispatch(&first.container_type, &product.id, quantity);
                remaining -= quantity;
            }
        }

        Ok(allocation)
    }

    /// Summed nominal capacity of every dispatched container, repeats included.
    fn total_volume(&self, containers: &[ContainerAssignment]) -> Result<f64, PackError> {
        containers
            .iter()
            .map(|c| self.catalog.volume_of_type(&c.container_type))
            .sum()
    }
}

/// Containers created for a single product, in creation order.
#[derive(Debug, Default)]
struct ProductAllocation {
    assignments: Vec<ContainerAssignment>,
    assigned: u32,
    /// Index of the first instance added by the reuse fallback.
    first_reused: usize,
}

impl ProductAllocation {
    fn dispatch(&mut self, container_type: &str, product_id: &str, quantity: u32) {
        self.assignments
            .push(ContainerAssignment::single(container_type, product_id, quantity));
        self.assigned += quantity;
    }
}

fn can_store_product(capacity: f64, unit_volume: f64) -> bool {
    capacity >= unit_volume
}

fn can_store_ordered_quantity(capacity: f64, product: &LineItem) -> bool {
    capacity >= total_volume(product)
}

/// Largest `n` with `n × unit_volume ≤ capacity`.
fn how_many_can_be_stored(capacity: f64, unit_volume: f64) -> u32 {
    // Float division may land just below or above an exact multiple.
    let mut quantity = (capacity / unit_volume).floor() as u32;
    while quantity > 0 && f64::from(quantity) * unit_volume > capacity {
        quantity -= 1;
    }
    while quantity < u32::MAX && f64::from(quantity + 1) * unit_volume <= capacity {
        quantity += 1;
    }
    quantity
}
