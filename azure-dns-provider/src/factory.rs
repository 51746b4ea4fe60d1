//! Provider factory functions.

use std::sync::Arc;

use crate::api::client::AzureDnsClient;
use crate::api::token::{ClientCredentialsToken, TokenSource};
use crate::config::AzureDnsConfig;
use crate::error::Result;
use crate::http_client::create_http_client;
use crate::interface::Interface;
use crate::zones::ZoneSettings;

/// Creates an [`Interface`] backed by the Azure Resource Manager API.
///
/// Authenticates as the configured service principal (client-credentials
/// grant). The configuration is validated first; no request is sent until
/// the first operation.
///
/// # Examples
///
/// ```rust,no_run
/// use azure_dns_provider::{AzureDnsConfig, create_provider};
///
/// let config = AzureDnsConfig::new(
///     "subscription-id",
///     "tenant-id",
///     "client-id",
///     "client-secret",
///     "dns-resource-group",
/// );
/// let provider = create_provider(&config).unwrap();
/// ```
pub fn create_provider(config: &AzureDnsConfig) -> Result<Interface> {
    config.validate()?;

    let client = create_http_client();
    let token_source = ClientCredentialsToken::with_client(
        client.clone(),
        config.tenant_id.clone(),
        config.client_id.clone(),
        config.secret.clone(),
    );
    Ok(build(config, Arc::new(token_source), Some(client)))
}

/// Like [`create_provider`], authenticating through `token_source` instead
/// of the configured service principal. Credential fields may be blank.
pub fn create_provider_with_token_source(
    config: &AzureDnsConfig,
    token_source: Arc<dyn TokenSource>,
) -> Result<Interface> {
    config.validate_target()?;
    Ok(build(config, token_source, None))
}

fn build(
    config: &AzureDnsConfig,
    token_source: Arc<dyn TokenSource>,
    client: Option<reqwest::Client>,
) -> Interface {
    let mut builder = AzureDnsClient::builder(
        config.subscription_id.clone(),
        config.resource_group.clone(),
        token_source,
    )
    .api_version(config.api_version.clone())
    .max_retries(config.max_retries);
    if let Some(client) = client {
        builder = builder.http_client(client);
    }

    log::debug!(
        "[azure-dns] Created provider for resource group {}",
        config.resource_group
    );
    Interface::with_settings(Arc::new(builder.build()), ZoneSettings::from(config))
}
