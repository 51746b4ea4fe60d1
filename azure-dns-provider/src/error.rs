use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Failure reported by a remote DNS API client.
///
/// Produced by [`DnsApi`](crate::DnsApi) implementations and carried verbatim
/// inside [`ProviderError`], so callers keep the remote diagnostic payload.
///
/// # Retryable Errors
///
/// - [`Network`](Self::Network): connectivity issues and 502/503/504 responses
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): HTTP 429
///
/// The HTTP client retries these with exponential backoff. The record set and
/// changeset layer never retries.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code")]
pub enum ApiError {
    /// A conditional write or delete was rejected (`If-Match` / `If-None-Match`, HTTP 412).
    #[error("Precondition failed: {message}")]
    PreconditionFailed {
        /// Original error message from the API.
        message: String,
    },

    /// The zone or record set does not exist (HTTP 404).
    #[error("Not found: {message}")]
    NotFound {
        /// Original error message from the API.
        message: String,
    },

    /// The request conflicts with the current remote state (HTTP 409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Original error message from the API.
        message: String,
    },

    /// Authentication or authorization failed (HTTP 401/403, token acquisition).
    #[error("Unauthorized (HTTP {status}): {message}")]
    Unauthorized {
        /// HTTP status code, `0` when no request was sent.
        status: u16,
        /// Original error message.
        message: String,
    },

    /// The API rate limit has been exceeded (HTTP 429).
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Suggested wait time in seconds, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message.
        message: String,
    },

    /// A network-level error occurred.
    #[error("Network error: {detail}")]
    Network {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    #[error("Request timeout: {detail}")]
    Timeout {
        /// Error details.
        detail: String,
    },

    /// Any other non-success response.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Provider error code (`error.code` in the response body), if present.
        error_code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {detail}")]
    Parse {
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    #[error("Serialization error: {detail}")]
    Serialization {
        /// Details about the serialization failure.
        detail: String,
    },

    /// The caller cancelled the operation before it completed.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Whether the transport may retry this failure.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

/// Unified error type for record set, changeset and zone operations.
///
/// Remote failures keep the underlying [`ApiError`] as their `source`; no
/// variant is retried or recovered locally.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ProviderError {
    /// The record type is outside the supported set (A, AAAA, CNAME).
    #[error("Unsupported record type: {record_type}")]
    UnsupportedRecordType {
        /// The record type tag as seen on the wire or supplied by the caller.
        record_type: String,
    },

    /// The record data cannot be encoded for its type.
    #[error("Invalid {record_type} record data: {detail}")]
    InvalidRecordData {
        /// Record type being encoded.
        record_type: String,
        /// What is wrong with the data.
        detail: String,
    },

    /// A record set name is neither the zone apex nor below it.
    #[error("Name '{name}' is outside zone '{zone}'")]
    NameOutsideZone {
        /// Name as supplied by the caller.
        name: String,
        /// Zone the record set was built for.
        zone: String,
    },

    /// Listing zones or record sets failed.
    #[error("Failed to list {target}: {source}")]
    RemoteList {
        /// What was being listed.
        target: String,
        /// Remote failure.
        source: ApiError,
    },

    /// Creating or updating a zone or record set failed.
    #[error("Failed to write {target}: {source}")]
    RemoteWrite {
        /// What was being written.
        target: String,
        /// Remote failure.
        source: ApiError,
    },

    /// A conditional write was rejected by the remote, e.g. adding a record set that already exists.
    #[error("Precondition failed writing {target}: {source}")]
    PreconditionFailed {
        /// What was being written.
        target: String,
        /// Remote failure.
        source: ApiError,
    },

    /// Deleting a zone or record set failed.
    #[error("Failed to delete {target}: {source}")]
    RemoteDelete {
        /// What was being deleted.
        target: String,
        /// Remote failure.
        source: ApiError,
    },

    /// The provider configuration is invalid.
    #[error("{0}")]
    InvalidConfig(#[from] ConfigError),
}

impl ProviderError {
    /// Wrap a failed create-or-update call.
    ///
    /// A rejected precondition becomes [`PreconditionFailed`](Self::PreconditionFailed),
    /// everything else [`RemoteWrite`](Self::RemoteWrite).
    pub fn write(target: impl Into<String>, source: ApiError) -> Self {
        let target = target.into();
        match source {
            ApiError::PreconditionFailed { .. } => Self::PreconditionFailed { target, source },
            source => Self::RemoteWrite { target, source },
        }
    }

    /// The remote failure behind this error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::RemoteList { source, .. }
            | Self::RemoteWrite { source, .. }
            | Self::PreconditionFailed { source, .. }
            | Self::RemoteDelete { source, .. } => Some(source),
            Self::UnsupportedRecordType { .. }
            | Self::InvalidRecordData { .. }
            | Self::NameOutsideZone { .. }
            | Self::InvalidConfig(_) => None,
        }
    }

    /// 是否为预期行为（调用方输入、资源冲突等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::UnsupportedRecordType { .. }
            | Self::InvalidRecordData { .. }
            | Self::NameOutsideZone { .. }
            | Self::PreconditionFailed { .. }
            | Self::InvalidConfig(_) => true,
            Self::RemoteList { source, .. }
            | Self::RemoteWrite { source, .. }
            | Self::RemoteDelete { source, .. } => matches!(
                source,
                ApiError::NotFound { .. } | ApiError::Conflict { .. } | ApiError::Cancelled
            ),
        }
    }

    /// 按 [`is_expected`](Self::is_expected) 分级记录日志后返回自身
    pub(crate) fn logged(self) -> Self {
        if self.is_expected() {
            log::warn!("[azure-dns] {self}");
        } else {
            log::error!("[azure-dns] {self}");
        }
        self
    }
}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Convenience type alias for `Result<T, ApiError>`, returned by remote clients.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
