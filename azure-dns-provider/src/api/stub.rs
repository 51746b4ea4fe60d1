//! 内存实现的 Azure DNS API
//!
//! Behaves like the remote service for the calls the provider makes:
//! conditional writes are enforced, every write assigns a fresh etag, reads
//! return the namespaced type tag, and listings honour `max_count`.
//! Unlike the real service, new zones carry no SOA/NS record sets.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::codec::TYPE_PREFIX;
use crate::error::{ApiError, ApiResult};
use crate::types::RrsType;
use crate::utils::names::relative_to_full_name;

use super::types::{RecordSet, RecordSetListResult, RecordSetProperties, Zone, ZoneListResult};
use super::{CancelSignal, DnsApi, IF_NONE_MATCH_ANY, WriteCondition};

const STUB_RESOURCE_GROUP_ID: &str =
    "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/stub/providers/Microsoft.Network/dnszones";
const ZONE_TYPE: &str = "Microsoft.Network/dnszones";

/// (zone, relative name, bare type tag)
type RecordKey = (String, String, String);

#[derive(Default)]
struct StubState {
    zones: BTreeMap<String, Zone>,
    record_sets: BTreeMap<RecordKey, RecordSet>,
    next_etag: u64,
}

impl StubState {
    fn fresh_etag(&mut self) -> String {
        self.next_etag += 1;
        format!("etag-{:08}", self.next_etag)
    }

    fn record_count(&self, zone_name: &str) -> usize {
        self.record_sets
            .keys()
            .filter(|(zone, _, _)| zone == zone_name)
            .count()
    }
}

/// Check `condition` against the etag of the current item (`None` if absent).
fn check_condition(current: Option<&str>, condition: &WriteCondition, what: &str) -> ApiResult<()> {
    if condition.if_none_match == IF_NONE_MATCH_ANY && current.is_some() {
        return Err(ApiError::PreconditionFailed {
            message: format!("{what} already exists"),
        });
    }
    if !condition.if_match.is_empty() && current != Some(condition.if_match.as_str()) {
        return Err(ApiError::PreconditionFailed {
            message: format!("{what} does not match etag '{}'", condition.if_match),
        });
    }
    Ok(())
}

/// In-memory [`DnsApi`] for tests and local development.
pub struct StubDnsApi {
    state: RwLock<StubState>,
}

impl Default for StubDnsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl StubDnsApi {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StubState::default()),
        }
    }

    /// Store a record set of any type tag without checks, e.g. `"NS"` or `"SOA"`.
    ///
    /// Returns `false` if the zone does not exist.
    pub async fn seed_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        type_tag: &str,
        properties: RecordSetProperties,
    ) -> bool {
        let mut state = self.state.write().await;
        if !state.zones.contains_key(zone_name) {
            return false;
        }
        let etag = state.fresh_etag();
        let record = stored_record_set(zone_name, relative_name, type_tag, etag, properties);
        state.record_sets.insert(
            (
                zone_name.to_string(),
                relative_name.to_string(),
                type_tag.to_uppercase(),
            ),
            record,
        );
        true
    }

    /// Names of all stored zones, sorted.
    pub async fn zone_names(&self) -> Vec<String> {
        self.state.read().await.zones.keys().cloned().collect()
    }

    /// The stored record set, if any.
    pub async fn record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
    ) -> Option<RecordSet> {
        self.state
            .read()
            .await
            .record_sets
            .get(&(
                zone_name.to_string(),
                relative_name.to_string(),
                record_type.as_str().to_string(),
            ))
            .cloned()
    }

    /// Number of record sets stored in the zone.
    pub async fn record_set_count(&self, zone_name: &str) -> usize {
        self.state.read().await.record_count(zone_name)
    }
}

fn stored_record_set(
    zone_name: &str,
    relative_name: &str,
    type_tag: &str,
    etag: String,
    mut properties: RecordSetProperties,
) -> RecordSet {
    let type_tag = type_tag.to_uppercase();
    properties.fqdn = Some(format!("{}.", relative_to_full_name(relative_name, zone_name)));
    RecordSet {
        id: Some(format!(
            "{STUB_RESOURCE_GROUP_ID}/{zone_name}/{type_tag}/{relative_name}"
        )),
        name: Some(relative_name.to_string()),
        record_type: Some(format!("{TYPE_PREFIX}{type_tag}")),
        etag: Some(etag),
        properties: Some(properties),
    }
}

#[async_trait]
impl DnsApi for StubDnsApi {
    async fn list_zones(&self, max_count: u32) -> ApiResult<ZoneListResult> {
        let state = self.state.read().await;
        let limit = usize::try_from(max_count).unwrap_or(usize::MAX);
        let value: Vec<Zone> = state.zones.values().take(limit).cloned().collect();
        let next_link = (state.zones.len() > value.len()).then(|| "stub://zones?page=2".to_string());
        Ok(ZoneListResult { value, next_link })
    }

    async fn create_or_update_zone(
        &self,
        zone_name: &str,
        zone: &Zone,
        condition: &WriteCondition,
    ) -> ApiResult<Zone> {
        let mut state = self.state.write().await;
        let current = state.zones.get(zone_name).and_then(|z| z.etag.as_deref());
        check_condition(current, condition, &format!("zone '{zone_name}'"))?;

        let etag = state.fresh_etag();
        let count = i64::try_from(state.record_count(zone_name)).unwrap_or(i64::MAX);
        let stored = Zone {
            id: Some(format!("{STUB_RESOURCE_GROUP_ID}/{zone_name}")),
            name: Some(zone_name.to_string()),
            zone_type: Some(ZONE_TYPE.to_string()),
            etag: Some(etag),
            location: zone.location.clone(),
            tags: zone.tags.clone(),
            properties: Some(super::types::ZoneProperties {
                max_number_of_record_sets: Some(10_000),
                number_of_record_sets: Some(count),
                name_servers: Some(vec![
                    "ns1-01.azure-dns.com.".to_string(),
                    "ns2-01.azure-dns.net.".to_string(),
                ]),
            }),
        };
        state.zones.insert(zone_name.to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete_zone(
        &self,
        zone_name: &str,
        if_match: &str,
        cancel: Option<CancelSignal>,
    ) -> ApiResult<()> {
        if cancel.as_ref().is_some_and(|signal| *signal.borrow()) {
            return Err(ApiError::Cancelled);
        }

        let mut state = self.state.write().await;
        let Some(zone) = state.zones.get(zone_name) else {
            return Err(ApiError::NotFound {
                message: format!("zone '{zone_name}' not found"),
            });
        };
        check_condition(
            zone.etag.as_deref(),
            &WriteCondition::if_match(if_match),
            &format!("zone '{zone_name}'"),
        )?;

        let count = state.record_count(zone_name);
        if count > 0 {
            return Err(ApiError::Conflict {
                message: format!("zone '{zone_name}' still contains {count} record sets"),
            });
        }
        state.zones.remove(zone_name);
        Ok(())
    }

    async fn list_record_sets_by_zone(
        &self,
        zone_name: &str,
        max_count: u32,
    ) -> ApiResult<RecordSetListResult> {
        let state = self.state.read().await;
        if !state.zones.contains_key(zone_name) {
            return Err(ApiError::NotFound {
                message: format!("zone '{zone_name}' not found"),
            });
        }

        let limit = usize::try_from(max_count).unwrap_or(usize::MAX);
        let total = state.record_count(zone_name);
        let value: Vec<RecordSet> = state
            .record_sets
            .iter()
            .filter(|((zone, _, _), _)| zone == zone_name)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect();
        let next_link = (total > value.len())
            .then(|| format!("stub://zones/{zone_name}/recordsets?page=2"));
        Ok(RecordSetListResult { value, next_link })
    }

    async fn create_or_update_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
        record_set: &RecordSet,
        condition: &WriteCondition,
    ) -> ApiResult<RecordSet> {
        let mut state = self.state.write().await;
        if !state.zones.contains_key(zone_name) {
            return Err(ApiError::NotFound {
                message: format!("zone '{zone_name}' not found"),
            });
        }

        let key = (
            zone_name.to_string(),
            relative_name.to_string(),
            record_type.as_str().to_string(),
        );
        let current = state.record_sets.get(&key).and_then(|r| r.etag.as_deref());
        check_condition(
            current,
            condition,
            &format!("{record_type} record set '{relative_name}'"),
        )?;

        let etag = state.fresh_etag();
        let stored = stored_record_set(
            zone_name,
            relative_name,
            record_type.as_str(),
            etag,
            record_set.properties.clone().unwrap_or_default(),
        );
        state.record_sets.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
        if_match: &str,
    ) -> ApiResult<()> {
        let mut state = self.state.write().await;
        if !state.zones.contains_key(zone_name) {
            return Err(ApiError::NotFound {
                message: format!("zone '{zone_name}' not found"),
            });
        }

        let key = (
            zone_name.to_string(),
            relative_name.to_string(),
            record_type.as_str().to_string(),
        );
        // 删除不存在的记录集视为成功
        let Some(current) = state.record_sets.get(&key) else {
            return Ok(());
        };
        check_condition(
            current.etag.as_deref(),
            &WriteCondition::if_match(if_match),
            &format!("{record_type} record set '{relative_name}'"),
        )?;
        state.record_sets.remove(&key);
        Ok(())
    }
}
