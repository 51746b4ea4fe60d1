//! Generic HTTP client tools
//!
//! Request execution with logging, transient-failure classification and
//! retries with exponential backoff. Callers build the `RequestBuilder`
//! themselves (URL, headers, body) and interpret the status code.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::utils::log_sanitizer::truncate_for_log;

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Upper bound for a server-suggested `Retry-After` wait.
const MAX_RETRY_AFTER_SECS: u64 = 30;
/// Upper bound for the exponential backoff delay.
const MAX_BACKOFF_MS: u64 = 10_000;

/// 创建带超时配置的 HTTP Client
///
/// Falls back to a client without timeouts if the TLS backend cannot be
/// initialised with the custom settings.
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Failed to build HTTP client with timeouts, using defaults: {e}");
            Client::new()
        })
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and return the status code and response text.
    ///
    /// HTTP 429 becomes [`ApiError::RateLimited`] and 502/503/504 become
    /// [`ApiError::Network`], so both can be retried. Every other status is
    /// handed back to the caller.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> ApiResult<(u16, String)> {
        log::debug!("[azure-dns] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ApiError::Network {
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[azure-dns] Response Status: {status_code}");

        // 在消费响应体之前读取 Retry-After
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[azure-dns] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ApiError::RateLimited {
                retry_after,
                message: truncate_for_log(&body),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[azure-dns] Server error (HTTP {status_code})");
            return Err(ApiError::Network {
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response.text().await.map_err(|e| ApiError::Network {
            detail: format!("Failed to read response body: {e}"),
        })?;

        log::debug!(
            "[azure-dns] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// [`execute_request`](Self::execute_request) with retries.
    ///
    /// Only network errors, timeouts and rate limiting are retried, with
    /// backoff of 100ms, 200ms, 400ms, ... capped at 10 seconds, or the
    /// server's `Retry-After` (capped at 30 seconds). `max_retries == 0`
    /// sends the request once.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
        max_retries: u32,
    ) -> ApiResult<(u16, String)> {
        if max_retries == 0 {
            return Self::execute_request(request_builder, method_name, url).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            // RequestBuilder 只能使用一次
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[azure-dns] Cannot clone request, disabling retry");
                return Self::execute_request(request_builder, method_name, url).await;
            };

            match Self::execute_request(req, method_name, url).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[azure-dns] {method_name} {url} failed (attempt {}/{}), retrying in {:.1}s: {e}",
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::Network {
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }

    /// Parse a JSON response body.
    pub fn parse_json<T>(response_text: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[azure-dns] JSON parse failed: {e}");
            log::error!(
                "[azure-dns] Raw response: {}",
                truncate_for_log(response_text)
            );
            ApiError::Parse {
                detail: e.to_string(),
            }
        })
    }
}

/// Delay before the next attempt: the server's `Retry-After` when rate
/// limited, exponential backoff otherwise.
fn retry_delay(error: &ApiError, attempt: u32) -> Duration {
    if let ApiError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
    } else {
        backoff_delay(attempt)
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // 防止 2^attempt 溢出
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}
