//! Bearer token sources for Azure Resource Manager.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ApiError, ApiResult};
use crate::http_client::{HttpUtils, create_http_client};
use crate::utils::log_sanitizer::{mask_secret, truncate_for_log};

/// Microsoft Entra ID authority.
const AUTHORITY: &str = "https://login.microsoftonline.com";
/// OAuth2 scope granting access to Azure Resource Manager.
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;
/// Lifetime assumed when the token response carries none.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
/// Upper bound for a reported token lifetime.
const MAX_EXPIRES_IN_SECS: i64 = 86_400;

/// Source of bearer tokens for API requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A token valid for at least the next request.
    async fn token(&self) -> ApiResult<String>;
}

/// A fixed, caller-provided bearer token.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken")
            .field(&mask_secret(&self.0))
            .finish()
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> ApiResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Token endpoint response. `expires_in` is a number on v2.0 endpoints and a
/// string on some older ones.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<ExpiresIn>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(i64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> i64 {
        match self {
            Self::Seconds(s) => *s,
            Self::Text(s) => s.trim().parse().unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// OAuth2 client-credentials grant for a service principal.
///
/// The token is cached and refreshed shortly before it expires.
pub struct ClientCredentialsToken {
    client: Client,
    tenant_id: String,
    client_id: String,
    secret: String,
    cache: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsToken {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self::with_client(create_http_client(), tenant_id, client_id, secret)
    }

    /// Use an existing HTTP client (shares its connection pool).
    pub fn with_client(
        client: Client,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            secret: secret.into(),
            cache: Mutex::new(None),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{AUTHORITY}/{}/oauth2/v2.0/token",
            urlencoding::encode(&self.tenant_id)
        )
    }

    async fn request_token(&self) -> ApiResult<CachedToken> {
        let url = self.token_url();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.secret.as_str()),
            ("scope", MANAGEMENT_SCOPE),
        ];

        let (status, body) =
            HttpUtils::execute_request(self.client.post(&url).form(&form), "POST", &url).await?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| truncate_for_log(&body));
            log::error!("[azure-dns] Token request failed (HTTP {status}): {message}");
            return Err(ApiError::Unauthorized { status, message });
        }

        let response: TokenResponse = HttpUtils::parse_json(&body)?;
        let expires_in = response
            .expires_in
            .as_ref()
            .map_or(DEFAULT_EXPIRES_IN_SECS, ExpiresIn::seconds)
            .clamp(0, MAX_EXPIRES_IN_SECS);

        log::debug!("[azure-dns] Acquired management token, expires in {expires_in}s");

        Ok(CachedToken {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

impl fmt::Debug for ClientCredentialsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsToken")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("secret", &mask_secret(&self.secret))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsToken {
    async fn token(&self) -> ApiResult<String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh(Utc::now())) {
            return Ok(cached.access_token.clone());
        }

        let fresh = self.request_token().await?;
        let token = fresh.access_token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}
