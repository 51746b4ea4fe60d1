//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use azure_dns_provider::api::stub::StubDnsApi;
use azure_dns_provider::api::types::{RecordSet, RecordSetListResult, Zone, ZoneListResult};
use azure_dns_provider::{
    ApiError, ApiResult, AzureDnsConfig, CancelSignal, DnsApi, Interface, RrsType, WriteCondition,
    create_provider,
};
use tokio::sync::RwLock;

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

// ===== RecordingDnsApi =====

/// One call received by [`RecordingDnsApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListZones {
        max_count: u32,
    },
    WriteZone {
        zone_name: String,
        location: Option<String>,
        condition: WriteCondition,
    },
    DeleteZone {
        zone_name: String,
        if_match: String,
    },
    ListRecordSets {
        zone_name: String,
        max_count: u32,
    },
    WriteRecordSet {
        zone_name: String,
        relative_name: String,
        record_type: RrsType,
        condition: WriteCondition,
    },
    DeleteRecordSet {
        zone_name: String,
        relative_name: String,
        record_type: RrsType,
        if_match: String,
    },
}

/// [`StubDnsApi`] wrapper that records every call and can fail chosen ones.
pub struct RecordingDnsApi {
    pub inner: StubDnsApi,
    calls: RwLock<Vec<Call>>,
    /// 命中该相对名称的记录集写入/删除时返回此错误
    fail_record_set: RwLock<Option<(String, ApiError)>>,
    /// 列表请求返回此错误
    fail_list: RwLock<Option<ApiError>>,
}

impl RecordingDnsApi {
    pub fn new() -> Self {
        Self {
            inner: StubDnsApi::new(),
            calls: RwLock::new(Vec::new()),
            fail_record_set: RwLock::new(None),
            fail_list: RwLock::new(None),
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Fail every write or delete of the record set with this relative name.
    pub async fn fail_record_set(&self, relative_name: &str, error: ApiError) {
        *self.fail_record_set.write().await = Some((relative_name.to_string(), error));
    }

    pub async fn fail_list(&self, error: ApiError) {
        *self.fail_list.write().await = Some(error);
    }

    async fn record(&self, call: Call) {
        self.calls.write().await.push(call);
    }

    async fn injected_record_set_failure(&self, relative_name: &str) -> ApiResult<()> {
        match &*self.fail_record_set.read().await {
            Some((name, error)) if name == relative_name => Err(error.clone()),
            _ => Ok(()),
        }
    }

    async fn injected_list_failure(&self) -> ApiResult<()> {
        match &*self.fail_list.read().await {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DnsApi for RecordingDnsApi {
    async fn list_zones(&self, max_count: u32) -> ApiResult<ZoneListResult> {
        self.record(Call::ListZones { max_count }).await;
        self.injected_list_failure().await?;
        self.inner.list_zones(max_count).await
    }

    async fn create_or_update_zone(
        &self,
        zone_name: &str,
        zone: &Zone,
        condition: &WriteCondition,
    ) -> ApiResult<Zone> {
        self.record(Call::WriteZone {
            zone_name: zone_name.to_string(),
            location: zone.location.clone(),
            condition: condition.clone(),
        })
        .await;
        self.inner
            .create_or_update_zone(zone_name, zone, condition)
            .await
    }

    async fn delete_zone(
        &self,
        zone_name: &str,
        if_match: &str,
        cancel: Option<CancelSignal>,
    ) -> ApiResult<()> {
        self.record(Call::DeleteZone {
            zone_name: zone_name.to_string(),
            if_match: if_match.to_string(),
        })
        .await;
        self.inner.delete_zone(zone_name, if_match, cancel).await
    }

    async fn list_record_sets_by_zone(
        &self,
        zone_name: &str,
        max_count: u32,
    ) -> ApiResult<RecordSetListResult> {
        self.record(Call::ListRecordSets {
            zone_name: zone_name.to_string(),
            max_count,
        })
        .await;
        self.injected_list_failure().await?;
        self.inner
            .list_record_sets_by_zone(zone_name, max_count)
            .await
    }

    async fn create_or_update_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
        record_set: &RecordSet,
        condition: &WriteCondition,
    ) -> ApiResult<RecordSet> {
        self.record(Call::WriteRecordSet {
            zone_name: zone_name.to_string(),
            relative_name: relative_name.to_string(),
            record_type,
            condition: condition.clone(),
        })
        .await;
        self.injected_record_set_failure(relative_name).await?;
        self.inner
            .create_or_update_record_set(zone_name, relative_name, record_type, record_set, condition)
            .await
    }

    async fn delete_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
        if_match: &str,
    ) -> ApiResult<()> {
        self.record(Call::DeleteRecordSet {
            zone_name: zone_name.to_string(),
            relative_name: relative_name.to_string(),
            record_type,
            if_match: if_match.to_string(),
        })
        .await;
        self.injected_record_set_failure(relative_name).await?;
        self.inner
            .delete_record_set(zone_name, relative_name, record_type, if_match)
            .await
    }
}

/// A zone stored in a fresh [`RecordingDnsApi`], with the call log cleared.
pub async fn recorded_zone(zone_name: &str) -> (azure_dns_provider::Zone, Arc<RecordingDnsApi>) {
    let api = Arc::new(RecordingDnsApi::new());
    let interface = Interface::new(api.clone());
    let zones = interface.zones();
    let zone = zones
        .add(&zones.new_zone(zone_name))
        .await
        .expect("creating the test zone in the stub succeeds");
    api.clear_calls().await;
    (zone, api)
}

/// 生成唯一的测试记录名称
pub fn generate_test_record_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装真实 Provider 和测试 Zone
pub struct TestContext {
    pub provider: Interface,
    pub zone: String,
}

impl TestContext {
    /// 从环境变量创建 Azure 测试上下文
    pub fn azure() -> Option<Self> {
        let config = AzureDnsConfig::new(
            env::var("AZURE_SUBSCRIPTION_ID").ok()?,
            env::var("AZURE_TENANT_ID").ok()?,
            env::var("AZURE_CLIENT_ID").ok()?,
            env::var("AZURE_CLIENT_SECRET").ok()?,
            env::var("AZURE_RESOURCE_GROUP").ok()?,
        );
        let zone = env::var("TEST_ZONE").ok()?;
        let provider = create_provider(&config).ok()?;
        Some(Self { provider, zone })
    }

    /// 查找测试 Zone
    pub async fn find_zone(&self) -> Option<azure_dns_provider::Zone> {
        let zones = self.provider.zones().list().await.ok()?;
        zones.into_iter().find(|zone| zone.name() == self.zone)
    }

    /// 清理所有测试记录（名称以 `_test-` 开头）
    pub async fn cleanup_all_test_records(&self, zone: &azure_dns_provider::Zone) {
        let rrsets = zone.resource_record_sets();
        let Ok(listed) = rrsets.list().await else {
            return;
        };
        let leftovers: Vec<_> = listed
            .into_iter()
            .filter(|rrset| rrset.relative_name().starts_with("_test-"))
            .collect();
        println!("找到 {} 条测试记录需要清理", leftovers.len());

        let changeset = leftovers
            .into_iter()
            .fold(rrsets.start_changeset(), |changeset, rrset| changeset.remove(rrset));
        if let Err(e) = changeset.apply().await {
            eprintln!("清理失败: {e}");
        }
    }
}
