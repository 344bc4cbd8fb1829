use std::env;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use log::{info, warn};

use crate::catalog::ContainerCatalog;
use crate::error::PackError;
use crate::model::ContainerSpec;
use crate::packer::OrderPacker;
use crate::types::DEFAULT_VOLUME_UNIT;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            catalog: CatalogConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "ORDER_PACKER_API_HOST";
    const PORT_VAR: &'static str = "ORDER_PACKER_API_PORT";

    fn from_env() -> Self {
        let host = env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match parse_host(&host) {
            Some(ip) => (ip, host),
            None => (
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                Self::DEFAULT_HOST.to_string(),
            ),
        };

        let port = env_string(Self::PORT_VAR)
            .and_then(|raw| parse_port(&raw, Self::PORT_VAR))
            .unwrap_or(Self::DEFAULT_PORT);

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

/// Where the container catalog and the volume label come from.
///
/// The built-in catalog is used only when no catalog path is configured.
/// A configured catalog that can't be loaded is kept as an error and
/// surfaces from `build_packer`.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    specs: Result<Vec<ContainerSpec>, CatalogError>,
    volume_unit: String,
}

impl CatalogConfig {
    const PATH_VAR: &'static str = "ORDER_PACKER_CATALOG_PATH";
    const VOLUME_UNIT_VAR: &'static str = "ORDER_PACKER_VOLUME_UNIT";

    fn from_env() -> Self {
        let volume_unit = env_string(Self::VOLUME_UNIT_VAR)
            .unwrap_or_else(|| DEFAULT_VOLUME_UNIT.to_string());
        Self::from_path(env_string(Self::PATH_VAR).as_deref(), volume_unit)
    }

    /// Loads the catalog from `path`, or the built-in catalog when `None`.
    pub fn from_path(path: Option<&str>, volume_unit: impl Into<String>) -> Self {
        let specs = match path {
            Some(path) => match load_catalog_file(path) {
                Ok(specs) => {
                    info!("📚 Loaded {} container type(s) from {}", specs.len(), path);
                    Ok(specs)
                }
                Err(reason) => Err(CatalogError::Unreadable {
                    path: path.to_string(),
                    reason,
                }),
            },
            None => Ok(ContainerCatalog::reference_specs()),
        };

        Self {
            specs,
            volume_unit: volume_unit.into(),
        }
    }

    /// Label reported with total volumes.
    pub fn volume_unit(&self) -> &str {
        &self.volume_unit
    }

    /// Builds the packer for the configured catalog.
    ///
    /// Fails if the configured file couldn't be read or parsed, or declares a
    /// malformed container type.
    pub fn build_packer(&self) -> Result<OrderPacker, CatalogError> {
        let specs = self.specs.clone()?;
        Ok(OrderPacker::new(specs)?.with_volume_unit(self.volume_unit.clone()))
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from_path(None, DEFAULT_VOLUME_UNIT)
    }
}

/// Why the configured container catalog can't be used.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog file is missing, unreadable, not JSON or empty.
    Unreadable { path: String, reason: String },
    /// The catalog declares a malformed container type.
    Invalid(PackError),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Unreadable { path, reason } => write!(
                f,
                "Could not load {} ('{}'): {}",
                CatalogConfig::PATH_VAR,
                path,
                reason
            ),
            CatalogError::Invalid(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<PackError> for CatalogError {
    fn from(err: PackError) -> Self {
        CatalogError::Invalid(err)
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("⚠️ Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_host(raw: &str) -> Option<IpAddr> {
    match raw.parse::<IpAddr>() {
        Ok(ip) => Some(ip),
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                ApiConfig::HOST_VAR,
                raw,
                err,
                ApiConfig::DEFAULT_HOST
            );
            None
        }
    }
}

fn parse_port(raw: &str, var_name: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => {
            warn!("⚠️ {} must not be 0. Using default value.", var_name);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}'): {}. Using default value.",
                var_name, raw, err
            );
            None
        }
    }
}

fn load_catalog_file(path: &str) -> Result<Vec<ContainerSpec>, String> {
    let raw = fs::read_to_string(path).map_err(|err| err.to_string())?;
    parse_catalog(&raw)
}

/// Parses a JSON array of container specs.
///
/// Dimensions are checked when the packer is built.
fn parse_catalog(raw: &str) -> Result<Vec<ContainerSpec>, String> {
    let specs: Vec<ContainerSpec> = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    if specs.is_empty() {
        return Err("catalog declares no container types".to_string());
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_port_valid_values() {
        assert_eq!(parse_port("8080", "TEST_VAR"), Some(8080));
        assert_eq!(parse_port(" 3000 ", "TEST_VAR"), Some(3000));
    }

    #[test]
    fn test_parse_port_invalid_values() {
        assert_eq!(parse_port("0", "TEST_VAR"), None);
        assert_eq!(parse_port("70000", "TEST_VAR"), None);
        assert_eq!(parse_port("http", "TEST_VAR"), None);
        assert_eq!(parse_port("", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(parse_host("127.0.0.1"), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert_eq!(parse_host("::"), Some(IpAddr::V6(Ipv6Addr::UNSPECIFIED)));
        assert_eq!(parse_host("localhost"), None);
    }

    #[test]
    fn test_parse_catalog_keeps_declaration_order() {
        let json = r#"[
            {"containerType": "Crate", "dimensions": {"unit": "centimeter", "length": 50, "width": 50, "height": 50}},
            {"containerType": "Envelope", "dimensions": {"unit": "centimeter", "length": 30, "width": 20, "height": 2}}
        ]"#;
        let specs = parse_catalog(json).expect("Should parse valid catalog");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].container_type, "Crate");
        assert_eq!(specs[1].container_type, "Envelope");
    }

    #[test]
    fn test_parse_catalog_rejects_invalid_input() {
        assert!(parse_catalog("[]").is_err());
        assert!(parse_catalog("{not json").is_err());
    }

    #[test]
    fn test_load_catalog_file_reports_missing_file() {
        assert!(load_catalog_file("/definitely/not/here/catalog.json").is_err());
    }

    fn write_catalog(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "order_packer_{}_{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).expect("Should write catalog file");
        path
    }

    #[test]
    fn test_default_catalog_builds_packer() {
        let config = CatalogConfig::default();
        assert_eq!(config.volume_unit(), "cubic centimeter");
        let packer = config.build_packer().expect("Default catalog must be valid");
        assert_eq!(packer.catalog().len(), 2);
        assert_eq!(packer.volume_unit(), "cubic centimeter");
    }

    #[test]
    fn test_configured_catalog_file_builds_packer() {
        let path = write_catalog(
            "valid",
            r#"[{"containerType": "Crate", "dimensions": {"unit": "inch", "length": 10, "width": 10, "height": 10}}]"#,
        );
        let config = CatalogConfig::from_path(path.to_str(), "cubic inch");
        let packer = config.build_packer().expect("Configured catalog must be valid");
        let _ = fs::remove_file(&path);

        assert_eq!(packer.catalog().len(), 1);
        assert_eq!(packer.catalog().containers()[0].container_type, "Crate");
        assert_eq!(packer.volume_unit(), "cubic inch");
    }

    #[test]
    fn test_malformed_catalog_entry_fails_build() {
        let path = write_catalog(
            "malformed",
            r#"[{"containerType": "Pallet", "dimensions": {"unit": "centimeter", "length": 120, "width": 80, "height": 0}}]"#,
        );
        let result = CatalogConfig::from_path(path.to_str(), DEFAULT_VOLUME_UNIT).build_packer();
        let _ = fs::remove_file(&path);

        match result {
            Err(CatalogError::Invalid(PackError::InvalidDimensions { subject, .. })) => {
                assert_eq!(subject, "Pallet");
            }
            other => panic!("expected malformed catalog to fail, got {:?}", other.map(|p| p.catalog().len())),
        }
    }

    #[test]
    fn test_unreadable_catalog_file_fails_build() {
        let config = CatalogConfig::from_path(
            Some("/definitely/not/here/catalog.json"),
            DEFAULT_VOLUME_UNIT,
        );
        let err = config.build_packer().unwrap_err();
        assert!(matches!(err, CatalogError::Unreadable { .. }));
        assert!(err.to_string().contains("/definitely/not/here/catalog.json"));

        let path = write_catalog("not_json", "{not json");
        let result = CatalogConfig::from_path(path.to_str(), DEFAULT_VOLUME_UNIT).build_packer();
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(CatalogError::Unreadable { .. })));
    }
}
