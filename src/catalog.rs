//! The fixed, ordered catalog of container types.
//!
//! Declaration order is the priority order of the packer: the first entry
//! that can take a product wins ties. The catalog is never re-sorted.

use log::warn;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::PackError;
use crate::model::ContainerSpec;
use crate::types::{Dimensions, Volumetric};

/// Capacity of one catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerTypeVolume {
    pub container_type: String,
    pub volume: f64,
}

/// Read-only list of container types in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ContainerCatalog {
    specs: Vec<ContainerSpec>,
}

impl ContainerCatalog {
    /// Builds a catalog, rejecting any entry with a non-positive dimension.
    ///
    /// Duplicate type names are accepted, but every lookup by name (and with
    /// it the nominal volume of a shipment) resolves to the first entry.
    ///
    /// # Examples
    /// ```
    /// use order_packer::catalog::ContainerCatalog;
    ///
    /// let catalog = ContainerCatalog::new(ContainerCatalog::reference_specs()).unwrap();
    /// assert_eq!(catalog.volume_of_type("Cardboard B").unwrap(), 4000.0);
    /// ```
    pub fn new(specs: Vec<ContainerSpec>) -> Result<Self, PackError> {
        for spec in &specs {
            spec.validate()?;
        }
        let catalog = Self { specs };
        for container_type in catalog.duplicate_types() {
            warn!(
                "⚠️ Container type '{}' is declared more than once; volumes are reported for its first entry",
                container_type
            );
        }
        Ok(catalog)
    }

    /// Type names declared more than once, in order of their second occurrence.
    pub fn duplicate_types(&self) -> Vec<&str> {
        let mut duplicates: Vec<&str> = Vec::new();
        for (idx, spec) in self.specs.iter().enumerate() {
            let name = spec.container_type.as_str();
            if self.specs[..idx].iter().any(|earlier| earlier.container_type == name)
                && !duplicates.contains(&name)
            {
                duplicates.push(name);
            }
        }
        duplicates
    }

    /// The two cardboard boxes used when no catalog is configured.
    pub fn reference_specs() -> Vec<ContainerSpec> {
        vec![
            ContainerSpec {
                container_type: "Cardboard A".to_string(),
                dimensions: Dimensions::new("centimeter", 30.0, 30.0, 30.0),
            },
            ContainerSpec {
                container_type: "Cardboard B".to_string(),
                dimensions: Dimensions::new("centimeter", 10.0, 20.0, 20.0),
            },
        ]
    }

    /// Catalog entries as supplied.
    pub fn containers(&self) -> &[ContainerSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Capacity of the first entry named `container_type`.
    pub fn volume_of_type(&self, container_type: &str) -> Result<f64, PackError> {
        self.specs
            .iter()
            .find(|spec| spec.container_type == container_type)
            .map(|spec| self.volume_of(spec))
            .ok_or_else(|| PackError::UnknownContainerType(container_type.to_string()))
    }

    /// Capacity of a given spec.
    #[inline]
    pub fn volume_of(&self, spec: &ContainerSpec) -> f64 {
        spec.volume()
    }

    /// One (type, capacity) pair per entry, in declaration order.
    pub fn all_volumes(&self) -> Vec<ContainerTypeVolume> {
        self.specs
            .iter()
            .map(|spec| ContainerTypeVolume {
                container_type: spec.container_type.clone(),
                volume: self.volume_of(spec),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_catalog() -> ContainerCatalog {
        ContainerCatalog::new(ContainerCatalog::reference_specs()).unwrap()
    }

    #[test]
    fn all_volumes_keep_declaration_order() {
        let volumes = reference_catalog().all_volumes();
        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0].container_type, "Cardboard A");
        assert_eq!(volumes[0].volume, 27000.0);
        assert_eq!(volumes[1].container_type, "Cardboard B");
        assert_eq!(volumes[1].volume, 4000.0);
    }

    #[test]
    fn smaller_first_entry_is_not_resorted() {
        let mut specs = ContainerCatalog::reference_specs();
        specs.reverse();
        let catalog = ContainerCatalog::new(specs).unwrap();
        assert_eq!(catalog.containers()[0].container_type, "Cardboard B");
        assert_eq!(catalog.all_volumes()[0].volume, 4000.0);
    }

    #[test]
    fn volume_of_type_resolves_first_match() {
        let mut specs = ContainerCatalog::reference_specs();
        specs.push(ContainerSpec {
            container_type: "Cardboard A".to_string(),
            dimensions: Dimensions::new("centimeter", 1.0, 1.0, 1.0),
        });
        let catalog = ContainerCatalog::new(specs).unwrap();
        assert_eq!(catalog.volume_of_type("Cardboard A").unwrap(), 27000.0);
        assert_eq!(catalog.duplicate_types(), vec!["Cardboard A"]);
    }

    #[test]
    fn distinct_types_report_no_duplicates() {
        assert!(reference_catalog().duplicate_types().is_empty());
    }

    #[test]
    fn volume_of_type_rejects_unknown_type() {
        let err = reference_catalog().volume_of_type("Pallet").unwrap_err();
        assert_eq!(err, PackError::UnknownContainerType("Pallet".to_string()));
    }

    #[test]
    fn rejects_malformed_entry() {
        let mut specs = ContainerCatalog::reference_specs();
        specs[1].dimensions.height = 0.0;
        let err = ContainerCatalog::new(specs).unwrap_err();
        assert!(matches!(err, PackError::InvalidDimensions { ref subject, .. } if subject == "Cardboard B"));
    }

    #[test]
    fn empty_catalog_is_allowed() {
        let catalog = ContainerCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.all_volumes().is_empty());
    }
}
