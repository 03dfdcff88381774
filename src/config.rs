//! Runtime configuration
//!
//! The pipeline needs one tuning value (the minimum distance) and the alias
//! table; the web shell additionally needs its listen address and upload cap.

use crate::error::{Result, ValidationError};
use crate::utils::aliases::AliasTable;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

pub const DEFAULT_MIN_DISTANCE_KM: f64 = 1.0;
pub const MIN_DISTANCE_LOWER_KM: f64 = 0.1;
pub const MIN_DISTANCE_UPPER_KM: f64 = 100.0;

/// Check an operator-supplied threshold against the accepted range
pub fn validate_threshold(km: f64) -> Result<f64> {
    if km.is_finite() && (MIN_DISTANCE_LOWER_KM..=MIN_DISTANCE_UPPER_KM).contains(&km) {
        Ok(km)
    } else {
        Err(ValidationError::InvalidThreshold {
            value: km,
            min: MIN_DISTANCE_LOWER_KM,
            max: MIN_DISTANCE_UPPER_KM,
        })
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub aliases: AliasTable,
    /// Used when the caller does not supply a threshold
    pub default_threshold_km: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            aliases: AliasTable::default(),
            default_threshold_km: DEFAULT_MIN_DISTANCE_KM,
        }
    }
}

impl ValidatorConfig {
    /// Defaults, with aliases optionally loaded from a JSON file
    pub fn with_alias_file(path: Option<&Path>, replace_defaults: bool) -> Result<Self> {
        let aliases = match path {
            Some(path) => AliasTable::load(path, replace_defaults)?,
            None => AliasTable::default(),
        };

        Ok(Self {
            aliases,
            ..Self::default()
        })
    }
}

/// Web shell configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_range() {
        assert_eq!(validate_threshold(0.1).unwrap(), 0.1);
        assert_eq!(validate_threshold(100.0).unwrap(), 100.0);
        assert_eq!(validate_threshold(DEFAULT_MIN_DISTANCE_KM).unwrap(), 1.0);

        assert!(validate_threshold(0.0).is_err());
        assert!(validate_threshold(100.1).is_err());
        assert!(validate_threshold(-1.0).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_threshold_message() {
        let err = validate_threshold(250.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Minimum distance must be between 0.1 and 100 km, got 250"
        );
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
    }
}
