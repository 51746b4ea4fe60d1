//! Remote Azure DNS API contract and its implementations.

/// HTTP client for the Azure Resource Manager DNS API.
pub mod client;
/// In-memory implementation of [`DnsApi`].
pub mod stub;
/// Bearer token sources.
pub mod token;
/// Azure DNS API request/response types.
pub mod types;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::types::RrsType;

use self::types::{RecordSet, RecordSetListResult, Zone, ZoneListResult};

/// `If-None-Match` value meaning "only if the resource does not exist yet".
pub const IF_NONE_MATCH_ANY: &str = "*";

/// Cancellation signal for [`DnsApi::delete_zone`]; the operation is
/// cancelled once the watched value becomes `true`.
pub type CancelSignal = tokio::sync::watch::Receiver<bool>;

/// Concurrency preconditions for a write.
///
/// An empty string means "no precondition".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteCondition {
    /// Write only if the current etag matches.
    pub if_match: String,
    /// `"*"` writes only if the resource does not exist.
    pub if_none_match: String,
}

impl WriteCondition {
    /// Write whether or not the resource exists.
    pub fn unconditional() -> Self {
        Self::default()
    }

    /// Write only if the resource does not exist yet.
    pub fn only_if_absent() -> Self {
        Self {
            if_match: String::new(),
            if_none_match: IF_NONE_MATCH_ANY.to_string(),
        }
    }

    /// Write only if the resource still carries `etag`.
    pub fn if_match(etag: impl Into<String>) -> Self {
        Self {
            if_match: etag.into(),
            if_none_match: String::new(),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.if_match.is_empty() && self.if_none_match.is_empty()
    }
}

/// Remote Azure DNS API.
///
/// Implementations own every network resource (connections, tokens). They
/// are shared read-only by all zones, collections and changesets derived
/// from one [`Interface`](crate::Interface).
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// 获取 Zone 列表，最多 `max_count` 个
    async fn list_zones(&self, max_count: u32) -> ApiResult<ZoneListResult>;

    /// 创建或更新 Zone
    async fn create_or_update_zone(
        &self,
        zone_name: &str,
        zone: &Zone,
        condition: &WriteCondition,
    ) -> ApiResult<Zone>;

    /// 删除 Zone
    ///
    /// The remote rejects zones that still hold record sets.
    async fn delete_zone(
        &self,
        zone_name: &str,
        if_match: &str,
        cancel: Option<CancelSignal>,
    ) -> ApiResult<()>;

    /// 获取 Zone 内的记录集列表，最多 `max_count` 个
    async fn list_record_sets_by_zone(
        &self,
        zone_name: &str,
        max_count: u32,
    ) -> ApiResult<RecordSetListResult>;

    /// 创建或更新记录集
    async fn create_or_update_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
        record_set: &RecordSet,
        condition: &WriteCondition,
    ) -> ApiResult<RecordSet>;

    /// 删除记录集
    async fn delete_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
        if_match: &str,
    ) -> ApiResult<()>;
}
