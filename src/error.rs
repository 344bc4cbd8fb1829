//! Errors raised while building a catalog or packing an order.

/// Everything that can make a packing call fail.
///
/// A failure always aborts the whole call; no partial shipment is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum PackError {
    /// A length of a container or product is not a positive, finite number.
    InvalidDimensions { subject: String, detail: String },
    /// A line item was ordered with quantity 0.
    InvalidQuantity { product_id: String, quantity: u32 },
    /// A container type was looked up that the catalog does not declare.
    UnknownContainerType(String),
    /// At least one product does not fit any container type, even as a single unit.
    Infeasible { product_ids: Vec<String> },
}

impl PackError {
    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            PackError::InvalidDimensions { .. } => "invalid_dimensions",
            PackError::InvalidQuantity { .. } => "invalid_quantity",
            PackError::UnknownContainerType(_) => "unknown_container_type",
            PackError::Infeasible { .. } => "infeasible",
        }
    }

    /// Product ids that made the order infeasible, empty for other errors.
    pub fn offending_products(&self) -> &[String] {
        match self {
            PackError::Infeasible { product_ids } => product_ids,
            _ => &[],
        }
    }
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::InvalidDimensions { subject, detail } => {
                write!(f, "Invalid dimensions for {}: {}", subject, detail)
            }
            PackError::InvalidQuantity {
                product_id,
                quantity,
            } => write!(
                f,
                "Invalid quantity for {}: must be at least 1, got: {}",
                product_id, quantity
            ),
            PackError::UnknownContainerType(container_type) => {
                write!(f, "Unknown container type: {}", container_type)
            }
            PackError::Infeasible { product_ids } => write!(
                f,
                "Order can't be packed: product(s) [{}] exceed every container's volume",
                product_ids.join(", ")
            ),
        }
    }
}

impl std::error::Error for PackError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_message_lists_every_product() {
        let err = PackError::Infeasible {
            product_ids: vec!["PRODUCT-003".to_string(), "PRODUCT-007".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("PRODUCT-003"));
        assert!(message.contains("PRODUCT-007"));
        assert_eq!(err.code(), "infeasible");
        assert_eq!(err.offending_products().len(), 2);
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            PackError::InvalidDimensions {
                subject: "x".to_string(),
                detail: "y".to_string(),
            },
            PackError::InvalidQuantity {
                product_id: "p".to_string(),
                quantity: 0,
            },
            PackError::UnknownContainerType("Crate".to_string()),
            PackError::Infeasible {
                product_ids: Vec::new(),
            },
        ];
        let mut codes: Vec<_> = errors.iter().map(PackError::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(errors[2].offending_products().is_empty());
    }
}
