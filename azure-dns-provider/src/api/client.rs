//! Azure Resource Manager DNS client

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{AzureDnsConfig, DEFAULT_API_VERSION, DEFAULT_MAX_RETRIES};
use crate::error::{ApiError, ApiResult};
use crate::http_client::{HttpUtils, create_http_client};
use crate::types::RrsType;
use crate::utils::log_sanitizer::truncate_for_log;

use super::token::TokenSource;
use super::types::{ErrorResponse, RecordSet, RecordSetListResult, Zone, ZoneListResult};
use super::{CancelSignal, DnsApi, WriteCondition};

/// Azure Resource Manager endpoint of the public cloud.
pub const ARM_ENDPOINT: &str = "https://management.azure.com";

/// [`DnsApi`] over the Azure Resource Manager REST API.
pub struct AzureDnsClient {
    client: Client,
    token_source: Arc<dyn TokenSource>,
    base_url: String,
    api_version: String,
    max_retries: u32,
}

/// Builder for [`AzureDnsClient`].
pub struct AzureDnsClientBuilder {
    subscription_id: String,
    resource_group: String,
    token_source: Arc<dyn TokenSource>,
    endpoint: String,
    api_version: String,
    max_retries: u32,
    client: Option<Client>,
}

impl AzureDnsClientBuilder {
    fn new(
        subscription_id: String,
        resource_group: String,
        token_source: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            subscription_id,
            resource_group,
            token_source,
            endpoint: ARM_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            client: None,
        }
    }

    /// Set the Resource Manager endpoint (sovereign clouds, test servers).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Use an existing HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> AzureDnsClient {
        let base_url = format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(&self.resource_group),
        );
        AzureDnsClient {
            client: self.client.unwrap_or_else(create_http_client),
            token_source: self.token_source,
            base_url,
            api_version: self.api_version,
            max_retries: self.max_retries,
        }
    }
}

impl AzureDnsClient {
    /// Returns a builder for customizing the client.
    pub fn builder(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        token_source: Arc<dyn TokenSource>,
    ) -> AzureDnsClientBuilder {
        AzureDnsClientBuilder::new(subscription_id.into(), resource_group.into(), token_source)
    }

    /// Create a client for the subscription and resource group in `config`.
    pub fn from_config(config: &AzureDnsConfig, token_source: Arc<dyn TokenSource>) -> Self {
        Self::builder(
            config.subscription_id.clone(),
            config.resource_group.clone(),
            token_source,
        )
        .api_version(config.api_version.clone())
        .max_retries(config.max_retries)
        .build()
    }

    /// Base URL of the `dnsZones` collection of the resource group.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ==================== URL 构建 ====================

    fn zones_url(&self, top: Option<u32>) -> String {
        let mut url = format!("{}?api-version={}", self.base_url, self.api_version);
        if let Some(top) = top {
            url.push_str(&format!("&$top={top}"));
        }
        url
    }

    fn zone_url(&self, zone_name: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.base_url,
            urlencoding::encode(zone_name),
            self.api_version
        )
    }

    fn record_sets_url(&self, zone_name: &str, top: u32) -> String {
        format!(
            "{}/{}/recordsets?api-version={}&$top={top}",
            self.base_url,
            urlencoding::encode(zone_name),
            self.api_version
        )
    }

    fn record_set_url(&self, zone_name: &str, relative_name: &str, record_type: RrsType) -> String {
        format!(
            "{}/{}/{}/{}?api-version={}",
            self.base_url,
            urlencoding::encode(zone_name),
            record_type.as_str(),
            urlencoding::encode(relative_name),
            self.api_version
        )
    }

    // ==================== 请求执行 ====================

    /// Attach authorization, request id and precondition headers.
    async fn prepare(
        &self,
        request: RequestBuilder,
        condition: &WriteCondition,
    ) -> ApiResult<RequestBuilder> {
        let token = self.token_source.token().await?;
        let mut request = request
            .bearer_auth(token)
            .header("x-ms-client-request-id", uuid::Uuid::new_v4().to_string());

        if !condition.if_match.is_empty() {
            request = request.header("If-Match", condition.if_match.as_str());
        }
        if !condition.if_none_match.is_empty() {
            request = request.header("If-None-Match", condition.if_none_match.as_str());
        }
        Ok(request)
    }

    /// Retry budget for a request carrying `condition`.
    ///
    /// Conditional requests are sent once: a write committed before a
    /// transient failure would fail its own precondition when replayed.
    fn retries_for(&self, condition: &WriteCondition) -> u32 {
        if condition.is_unconditional() {
            self.max_retries
        } else {
            0
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        condition: &WriteCondition,
        method: &str,
        url: &str,
    ) -> ApiResult<(u16, String)> {
        let max_retries = self.retries_for(condition);
        let (status, body) =
            HttpUtils::execute_request_with_retry(request, method, url, max_retries).await?;
        if (200..300).contains(&status) {
            Ok((status, body))
        } else {
            let error = map_status(status, &body);
            log::debug!("[azure-dns] {method} {url} failed: {error}");
            Err(error)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let condition = WriteCondition::unconditional();
        let request = self.prepare(self.client.get(url), &condition).await?;
        let (_, body) = self.send(request, &condition, "GET", url).await?;
        HttpUtils::parse_json(&body)
    }

    async fn put_json<T, B>(&self, url: &str, body: &B, condition: &WriteCondition) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = serde_json::to_string(body).map_err(|e| ApiError::Serialization {
            detail: e.to_string(),
        })?;
        log::debug!("[azure-dns] Request Body: {}", truncate_for_log(&payload));

        let request = self
            .client
            .put(url)
            .header("Content-Type", "application/json")
            .body(payload);
        let request = self.prepare(request, condition).await?;
        let (_, response) = self.send(request, condition, "PUT", url).await?;
        HttpUtils::parse_json(&response)
    }

    async fn delete(&self, url: &str, if_match: &str) -> ApiResult<()> {
        let condition = WriteCondition::if_match(if_match);
        let request = self.prepare(self.client.delete(url), &condition).await?;
        let (status, _) = self.send(request, &condition, "DELETE", url).await?;
        if status == 202 {
            log::debug!("[azure-dns] DELETE {url} accepted");
        }
        Ok(())
    }
}

/// Map a non-success HTTP status and its ARM error body to an [`ApiError`].
pub fn map_status(status: u16, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error);
    let error_code = parsed.as_ref().and_then(|e| e.code.clone());
    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| truncate_for_log(body));

    match status {
        412 => ApiError::PreconditionFailed { message },
        404 => ApiError::NotFound { message },
        409 => ApiError::Conflict { message },
        401 | 403 => ApiError::Unauthorized { status, message },
        429 => ApiError::RateLimited {
            retry_after: None,
            message,
        },
        502..=504 => ApiError::Network {
            detail: format!("HTTP {status}: {message}"),
        },
        _ => ApiError::Status {
            status,
            error_code,
            message,
        },
    }
}

/// Resolves once the watched value is `true`. Never resolves if the sender
/// is dropped without signalling.
async fn cancelled(mut signal: CancelSignal) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl DnsApi for AzureDnsClient {
    async fn list_zones(&self, max_count: u32) -> ApiResult<ZoneListResult> {
        self.get_json(&self.zones_url(Some(max_count))).await
    }

    async fn create_or_update_zone(
        &self,
        zone_name: &str,
        zone: &Zone,
        condition: &WriteCondition,
    ) -> ApiResult<Zone> {
        self.put_json(&self.zone_url(zone_name), zone, condition)
            .await
    }

    async fn delete_zone(
        &self,
        zone_name: &str,
        if_match: &str,
        cancel: Option<CancelSignal>,
    ) -> ApiResult<()> {
        let url = self.zone_url(zone_name);
        match cancel {
            None => self.delete(&url, if_match).await,
            Some(signal) => {
                tokio::select! {
                    result = self.delete(&url, if_match) => result,
                    () = cancelled(signal) => {
                        log::warn!("[azure-dns] Deleting zone {zone_name} cancelled");
                        Err(ApiError::Cancelled)
                    }
                }
            }
        }
    }

    async fn list_record_sets_by_zone(
        &self,
        zone_name: &str,
        max_count: u32,
    ) -> ApiResult<RecordSetListResult> {
        self.get_json(&self.record_sets_url(zone_name, max_count))
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
        let url = self.record_set_url(zone_name, relative_name, record_type);
        self.put_json(&url, record_set, condition).await
    }

    async fn delete_record_set(
        &self,
        zone_name: &str,
        relative_name: &str,
        record_type: RrsType,
        if_match: &str,
    ) -> ApiResult<()> {
        let url = self.record_set_url(zone_name, relative_name, record_type);
        self.delete(&url, if_match).await
    }
}
