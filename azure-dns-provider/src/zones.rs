//! DNS zones

use std::fmt;
use std::sync::Arc;

use crate::api::types::Zone as ApiZone;
use crate::api::{CancelSignal, DnsApi, WriteCondition};
use crate::config::{
    AzureDnsConfig, DEFAULT_LOCATION, DEFAULT_RECORD_SET_PAGE_SIZE, DEFAULT_ZONE_LIST_LIMIT,
};
use crate::error::{ProviderError, Result};
use crate::rrsets::ResourceRecordSets;
use crate::types::Listing;
use crate::utils::names::normalize_domain_name;

/// Settings shared by all zones of one [`Interface`](crate::Interface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSettings {
    /// Location assigned to new zones.
    pub location: String,
    /// Maximum number of zones returned by [`Zones::list`].
    pub zone_list_limit: u32,
    /// Maximum number of record sets returned by
    /// [`ResourceRecordSets::list`].
    pub record_set_page_size: u32,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            zone_list_limit: DEFAULT_ZONE_LIST_LIMIT,
            record_set_page_size: DEFAULT_RECORD_SET_PAGE_SIZE,
        }
    }
}

impl From<&AzureDnsConfig> for ZoneSettings {
    fn from(config: &AzureDnsConfig) -> Self {
        Self {
            location: config.location.clone(),
            zone_list_limit: config.zone_list_limit,
            record_set_page_size: config.record_set_page_size,
        }
    }
}

/// The zones of the configured resource group.
#[derive(Clone)]
pub struct Zones {
    api: Arc<dyn DnsApi>,
    settings: ZoneSettings,
}

impl Zones {
    pub(crate) fn new(api: Arc<dyn DnsApi>, settings: ZoneSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> &ZoneSettings {
        &self.settings
    }

    /// Zones of the resource group, at most
    /// [`zone_list_limit`](ZoneSettings::zone_list_limit).
    pub async fn list(&self) -> Result<Vec<Zone>> {
        let page = self.list_page().await?;
        if page.truncated {
            log::warn!(
                "[azure-dns] Zone listing truncated at {} zones",
                page.page_size
            );
        }
        Ok(page.items)
    }

    /// Like [`list`](Self::list), also reporting truncation.
    pub async fn list_page(&self) -> Result<Listing<Zone>> {
        let limit = self.settings.zone_list_limit;
        log::debug!("[azure-dns] Listing zones (limit {limit})");

        let result = self.api.list_zones(limit).await.map_err(|source| {
            ProviderError::RemoteList {
                target: "zones".to_string(),
                source,
            }
            .logged()
        })?;

        let truncated = result.next_link.is_some();
        let zones = result
            .value
            .into_iter()
            .map(|zone| Zone::from_api(zone, self.clone()))
            .collect::<Vec<_>>();
        log::debug!("[azure-dns] Got {} zones", zones.len());
        Ok(Listing::new(zones, limit, truncated))
    }

    /// Create the zone remotely. Returns the zone as stored, with its
    /// provider id and etag.
    pub async fn add(&self, zone: &Zone) -> Result<Zone> {
        let body = ApiZone {
            name: Some(zone.name().to_string()),
            location: Some(self.settings.location.clone()),
            ..Default::default()
        };
        log::info!(
            "[azure-dns] Creating zone {} in {}",
            zone.name(),
            self.settings.location
        );

        let stored = self
            .api
            .create_or_update_zone(zone.name(), &body, &WriteCondition::unconditional())
            .await
            .map_err(|source| {
                ProviderError::write(format!("zone '{}'", zone.name()), source).logged()
            })?;

        let mut created = Zone::from_api(stored, self.clone());
        if created.name.is_empty() {
            created.name.clone_from(&zone.name);
        }
        Ok(created)
    }

    /// Delete the zone. The API rejects zones that still hold record sets.
    ///
    /// `cancel` aborts the request once it carries `true`.
    pub async fn remove(&self, zone: &Zone, cancel: Option<CancelSignal>) -> Result<()> {
        log::info!("[azure-dns] Removing zone {} (id {})", zone.name(), zone.id());
        self.api
            .delete_zone(zone.name(), "", cancel)
            .await
            .map_err(|source| {
                ProviderError::RemoteDelete {
                    target: format!("zone '{}'", zone.name()),
                    source,
                }
                .logged()
            })
    }

    /// An unsaved zone, without any network call. Its id is its name until
    /// it is added.
    pub fn new_zone(&self, name: &str) -> Zone {
        let name = normalize_domain_name(name);
        Zone {
            id: name.clone(),
            name,
            etag: None,
            location: None,
            zones: self.clone(),
        }
    }
}

impl fmt::Debug for Zones {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zones")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// A DNS zone.
#[derive(Clone)]
pub struct Zone {
    name: String,
    id: String,
    etag: Option<String>,
    location: Option<String>,
    zones: Zones,
}

impl Zone {
    fn from_api(zone: ApiZone, zones: Zones) -> Self {
        let name = normalize_domain_name(zone.name.as_deref().unwrap_or_default());
        Self {
            id: zone.id.unwrap_or_else(|| name.clone()),
            name,
            etag: zone.etag,
            location: zone.location,
            zones,
        }
    }

    /// Zone name without trailing dot.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provider resource id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn resource_record_sets(&self) -> ResourceRecordSets<'_> {
        ResourceRecordSets::new(self)
    }

    /// The collection this zone came from.
    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    pub(crate) fn api(&self) -> &dyn DnsApi {
        self.zones.api.as_ref()
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("etag", &self.etag)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubDnsApi;

    fn zones() -> Zones {
        Zones::new(Arc::new(StubDnsApi::new()), ZoneSettings::default())
    }

    #[test]
    fn new_zone_is_local() {
        let zone = zones().new_zone("example.com.");
        assert_eq!(zone.name(), "example.com");
        assert_eq!(zone.id(), "example.com");
        assert!(zone.etag().is_none());
        assert!(zone.location().is_none());
    }

    #[test]
    fn from_api_strips_trailing_dot() {
        let zone = Zone::from_api(
            ApiZone {
                id: Some("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/dnszones/example.com".to_string()),
                name: Some("example.com.".to_string()),
                etag: Some("00000002-0000-0000".to_string()),
                location: Some("global".to_string()),
                ..Default::default()
            },
            zones(),
        );
        assert_eq!(zone.name(), "example.com");
        assert!(zone.id().ends_with("/dnszones/example.com"));
        assert_eq!(zone.etag(), Some("00000002-0000-0000"));
        assert_eq!(zone.location(), Some("global"));
    }

    #[tokio::test]
    async fn add_returns_stored_zone() {
        let zones = zones();
        let added = zones.add(&zones.new_zone("example.com")).await.unwrap();
        assert_eq!(added.name(), "example.com");
        assert_eq!(added.location(), Some(DEFAULT_LOCATION));
        assert!(added.etag().is_some());
        assert_ne!(added.id(), "example.com");
    }

    #[test]
    fn settings_from_config() {
        let mut config = AzureDnsConfig::new("s", "t", "c", "secret", "rg");
        config.location = "westeurope".to_string();
        config.record_set_page_size = 10;
        let settings = ZoneSettings::from(&config);
        assert_eq!(settings.location, "westeurope");
        assert_eq!(settings.record_set_page_size, 10);
        assert_eq!(settings.zone_list_limit, DEFAULT_ZONE_LIST_LIMIT);
    }
}
