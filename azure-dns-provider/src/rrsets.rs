//! Per-zone resource record set collection

use crate::api::types::RecordSet;
use crate::changeset::ResourceRecordChangeset;
use crate::codec;
use crate::error::{ProviderError, Result};
use crate::rrset::ResourceRecordSet;
use crate::types::{Listing, RrsType};
use crate::utils::names::full_name_to_relative;
use crate::zones::Zone;

/// The record sets of one zone.
#[derive(Debug, Clone, Copy)]
pub struct ResourceRecordSets<'z> {
    zone: &'z Zone,
}

impl<'z> ResourceRecordSets<'z> {
    pub(crate) fn new(zone: &'z Zone) -> Self {
        Self { zone }
    }

    /// All record sets of the zone, in the order the API returns them.
    ///
    /// Only one page is requested (see
    /// [`ZoneSettings::record_set_page_size`](crate::ZoneSettings)); a
    /// truncated listing is logged.
    pub async fn list(&self) -> Result<Vec<ResourceRecordSet<'z>>> {
        let page = self.list_page().await?;
        if page.truncated {
            log::warn!(
                "[azure-dns] Record set listing of zone {} truncated at {} entries",
                self.zone.name(),
                page.page_size
            );
        }
        Ok(page.items)
    }

    /// Like [`list`](Self::list), also reporting whether the remote held more
    /// record sets than the page size.
    pub async fn list_page(&self) -> Result<Listing<ResourceRecordSet<'z>>> {
        let zone_name = self.zone.name();
        let page_size = self.zone.zones().settings().record_set_page_size;
        log::debug!("[azure-dns] Listing record sets of zone {zone_name}");

        let result = self
            .zone
            .api()
            .list_record_sets_by_zone(zone_name, page_size)
            .await
            .map_err(|source| {
                ProviderError::RemoteList {
                    target: format!("record sets of zone '{zone_name}'"),
                    source,
                }
                .logged()
            })?;

        let truncated = result.next_link.is_some();
        let items = result
            .value
            .into_iter()
            .map(|record| ResourceRecordSet::new(record, *self))
            .collect();
        Ok(Listing::new(items, page_size, truncated))
    }

    /// Record sets whose fully-qualified [`name`](ResourceRecordSet::name)
    /// equals `name` exactly, one per record type.
    pub async fn get(&self, name: &str) -> Result<Vec<ResourceRecordSet<'z>>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|rrset| rrset.name() == name)
            .collect())
    }

    /// An empty changeset for this zone.
    pub fn start_changeset(&self) -> ResourceRecordChangeset<'z> {
        ResourceRecordChangeset::new(*self)
    }

    /// Build a record set locally, without any network call.
    ///
    /// `name` is fully-qualified; a trailing dot and the zone suffix are
    /// stripped, and names outside the zone are rejected. Address data is
    /// deduplicated; empty data and multi-valued CNAMEs are rejected.
    pub fn new_record_set<I, S>(
        &self,
        name: &str,
        rrdatas: I,
        ttl: u32,
        rrs_type: RrsType,
    ) -> Result<ResourceRecordSet<'z>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let relative_name = full_name_to_relative(name, self.zone.name()).ok_or_else(|| {
            ProviderError::NameOutsideZone {
                name: name.to_string(),
                zone: self.zone.name().to_string(),
            }
        })?;
        let rrdatas: Vec<String> = rrdatas.into_iter().map(Into::into).collect();
        let mut properties = codec::encode(rrs_type, &rrdatas)?;
        properties.ttl = Some(i64::from(ttl));

        let record = RecordSet {
            name: Some(relative_name),
            record_type: Some(rrs_type.as_str().to_string()),
            properties: Some(properties),
            ..Default::default()
        };
        Ok(ResourceRecordSet::new(record, *self))
    }

    /// The parent zone.
    pub fn zone(&self) -> &'z Zone {
        self.zone
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::stub::StubDnsApi;
    use crate::interface::Interface;

    #[test]
    fn new_record_set_round_trips_name() {
        let interface = Interface::new(Arc::new(StubDnsApi::new()));
        let zone = interface.zones().new_zone("example.com");
        let rrsets = zone.resource_record_sets();

        for name in ["www.example.com", "a.b.example.com", "example.com"] {
            let rrset = rrsets
                .new_record_set(name, ["192.0.2.1"], 300, RrsType::A)
                .unwrap();
            assert_eq!(rrset.name(), name);
        }
    }

    #[test]
    fn new_record_set_strips_trailing_dot() {
        let interface = Interface::new(Arc::new(StubDnsApi::new()));
        let zone = interface.zones().new_zone("example.com");
        let rrset = zone
            .resource_record_sets()
            .new_record_set("www.example.com.", ["192.0.2.1"], 300, RrsType::A)
            .unwrap();
        assert_eq!(rrset.relative_name(), "www");
        assert_eq!(rrset.record_set().record_type.as_deref(), Some("A"));
    }

    #[test]
    fn new_record_set_dedupes_a_records() {
        let interface = Interface::new(Arc::new(StubDnsApi::new()));
        let zone = interface.zones().new_zone("example.com");
        let rrset = zone
            .resource_record_sets()
            .new_record_set(
                "www.example.com",
                ["203.0.113.5", "203.0.113.5"],
                180,
                RrsType::A,
            )
            .unwrap();
        assert_eq!(rrset.rrdatas().unwrap(), vec!["203.0.113.5".to_string()]);
        assert_eq!(rrset.ttl(), 180);
        assert!(rrset.etag().is_none());
    }

    #[test]
    fn new_record_set_rejects_bad_data() {
        let interface = Interface::new(Arc::new(StubDnsApi::new()));
        let zone = interface.zones().new_zone("example.com");
        let rrsets = zone.resource_record_sets();

        assert!(matches!(
            rrsets.new_record_set("www.example.com", Vec::<String>::new(), 60, RrsType::A),
            Err(ProviderError::InvalidRecordData { .. })
        ));
        assert!(matches!(
            rrsets.new_record_set(
                "alias.example.com",
                ["a.example.net", "b.example.net"],
                60,
                RrsType::Cname
            ),
            Err(ProviderError::InvalidRecordData { .. })
        ));
    }

    #[test]
    fn new_record_set_rejects_names_outside_zone() {
        let interface = Interface::new(Arc::new(StubDnsApi::new()));
        let zone = interface.zones().new_zone("example.com");
        let rrsets = zone.resource_record_sets();

        for name in ["www.example.org", "wwwexample.com", "com"] {
            assert!(matches!(
                rrsets.new_record_set(name, ["192.0.2.1"], 60, RrsType::A),
                Err(ProviderError::NameOutsideZone { name: ref n, ref zone })
                    if n == name && zone == "example.com"
            ));
        }
    }

    #[test]
    fn zone_back_reference() {
        let interface = Interface::new(Arc::new(StubDnsApi::new()));
        let zone = interface.zones().new_zone("example.com");
        let rrsets = zone.resource_record_sets();
        assert_eq!(rrsets.zone().name(), "example.com");
        assert!(rrsets.start_changeset().is_empty());
    }
}
