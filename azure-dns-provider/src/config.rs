//! Provider configuration
//!
//! Accepted either as JSON (camelCase keys) or as a flat key/value map using
//! the legacy INI keys (`subscription-id`, `tenant-id`, `client-id`, `secret`,
//! `resourceGroup`).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::log_sanitizer::mask_secret;

/// Default Azure location for new zones. DNS zones are global resources.
pub const DEFAULT_LOCATION: &str = "global";
/// Default maximum number of zones returned by one listing.
pub const DEFAULT_ZONE_LIST_LIMIT: u32 = 100;
/// Default maximum number of record sets returned by one listing.
pub const DEFAULT_RECORD_SET_PAGE_SIZE: u32 = 1000;
/// Azure DNS REST API version.
pub const DEFAULT_API_VERSION: &str = "2018-05-01";
/// Default number of automatic retries for transient HTTP failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Configuration validation error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ConfigError {
    /// One or more required fields are missing or blank.
    #[error("Missing required configuration: {}", fields.join(", "))]
    MissingFields {
        /// Configuration keys, in the order they are checked.
        fields: Vec<String>,
    },

    /// A field is present but its value is unusable.
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Configuration key.
        field: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {detail}")]
    Parse {
        /// Parser message.
        detail: String,
    },
}

/// Azure DNS provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureDnsConfig {
    #[serde(default, alias = "subscription-id")]
    pub subscription_id: String,
    #[serde(default, alias = "tenant-id")]
    pub tenant_id: String,
    #[serde(default, alias = "client-id")]
    pub client_id: String,
    /// Client secret of the service principal.
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub resource_group: String,
    /// Location assigned to zones created through [`Zones::add`](crate::Zones::add).
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_zone_list_limit")]
    pub zone_list_limit: u32,
    #[serde(default = "default_record_set_page_size")]
    pub record_set_page_size: u32,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_zone_list_limit() -> u32 {
    DEFAULT_ZONE_LIST_LIMIT
}

fn default_record_set_page_size() -> u32 {
    DEFAULT_RECORD_SET_PAGE_SIZE
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl AzureDnsConfig {
    /// Create a configuration with default settings.
    pub fn new(
        subscription_id: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            secret: secret.into(),
            resource_group: resource_group.into(),
            location: default_location(),
            zone_list_limit: DEFAULT_ZONE_LIST_LIMIT,
            record_set_page_size: DEFAULT_RECORD_SET_PAGE_SIZE,
            api_version: default_api_version(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Parse a JSON document. The result is not validated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            detail: e.to_string(),
        })
    }

    /// Build from a flat key/value map using the legacy `[Global]` keys.
    ///
    /// Missing keys are left blank and reported by [`validate`](Self::validate).
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let field = |key: &str| map.get(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let mut config = Self::new(
            field("subscription-id"),
            field("tenant-id"),
            field("client-id"),
            field("secret"),
            field("resourceGroup"),
        );

        if let Some(location) = map.get("location") {
            config.location = location.trim().to_string();
        }
        if let Some(limit) = map.get("zoneListLimit") {
            config.zone_list_limit = parse_count("zoneListLimit", limit)?;
        }
        if let Some(size) = map.get("recordSetPageSize") {
            config.record_set_page_size = parse_count("recordSetPageSize", size)?;
        }

        Ok(config)
    }

    /// Check that every credential field is set and the limits are usable.
    ///
    /// All missing fields are reported at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<String> = [
            ("subscription-id", &self.subscription_id),
            ("tenant-id", &self.tenant_id),
            ("client-id", &self.client_id),
            ("secret", &self.secret),
            ("resourceGroup", &self.resource_group),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key.to_string())
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingFields { fields: missing });
        }

        self.validate_target()
    }

    /// Check only the settings needed to address the API (no client secret).
    pub fn validate_target(&self) -> Result<(), ConfigError> {
        let missing: Vec<String> = [
            ("subscription-id", &self.subscription_id),
            ("resourceGroup", &self.resource_group),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key.to_string())
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingFields { fields: missing });
        }
        if self.zone_list_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "zoneListLimit".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.record_set_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recordSetPageSize".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.location.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "location".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_count(field: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

impl fmt::Debug for AzureDnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureDnsConfig")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("secret", &mask_secret(&self.secret))
            .field("resource_group", &self.resource_group)
            .field("location", &self.location)
            .field("zone_list_limit", &self.zone_list_limit)
            .field("record_set_page_size", &self.record_set_page_size)
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
