//! Provider entry point

use std::sync::Arc;

use crate::api::DnsApi;
use crate::zones::{ZoneSettings, Zones};

/// Name under which this provider is registered by callers.
pub const PROVIDER_NAME: &str = "azure-azuredns";

/// Azure DNS provider handle.
///
/// Cheap to clone; every clone shares the same remote client.
#[derive(Debug, Clone)]
pub struct Interface {
    zones: Zones,
}

impl Interface {
    /// Wrap a remote client with default [`ZoneSettings`].
    pub fn new(api: Arc<dyn DnsApi>) -> Self {
        Self::with_settings(api, ZoneSettings::default())
    }

    pub fn with_settings(api: Arc<dyn DnsApi>, settings: ZoneSettings) -> Self {
        Self {
            zones: Zones::new(api, settings),
        }
    }

    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    pub fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
