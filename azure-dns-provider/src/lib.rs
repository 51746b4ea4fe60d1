//! # azure-dns-provider
//!
//! Azure DNS support for a provider-neutral DNS model: zones, resource record
//! sets and ordered changesets, translated to and from the Azure Resource
//! Manager `Microsoft.Network/dnsZones` API.
//!
//! ## Supported Record Types
//!
//! | Type | Record data | Notes |
//! |------|-------------|-------|
//! | `A` | IPv4 address literals | duplicates removed |
//! | `AAAA` | IPv6 address literals | duplicates removed |
//! | `CNAME` | one target name | more than one value is rejected |
//!
//! Record sets of other types (SOA, NS, MX, ...) are listed, but reading
//! their type or data fails with [`ProviderError::UnsupportedRecordType`].
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use azure_dns_provider::{AzureDnsConfig, RrsType, create_provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AzureDnsConfig::from_json(&std::fs::read_to_string("azure-dns.json")?)?;
//!     let provider = create_provider(&config)?;
//!
//!     let zones = provider.zones().list().await?;
//!     let zone = &zones[0];
//!     let rrsets = zone.resource_record_sets();
//!
//!     let www = rrsets.new_record_set("www.example.com", ["203.0.113.5"], 300, RrsType::A)?;
//!     rrsets.start_changeset().upsert(www).apply().await?;
//!
//!     for rrset in rrsets.get("www.example.com").await? {
//!         println!("{} {} {:?}", rrset.name(), rrset.rrs_type()?, rrset.rrdatas()?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Changesets
//!
//! [`ResourceRecordChangeset::apply`] sends removals first, then upserts
//! (unconditional writes), then additions (`If-None-Match: *`, so adding an
//! existing record set fails with [`ProviderError::PreconditionFailed`]).
//! It stops at the first failure and does not roll back.
//!
//! ## Error Handling
//!
//! Operations return [`Result<T, ProviderError>`](ProviderError). Remote
//! failures keep the [`ApiError`] reported by the client. The HTTP client
//! retries transient failures (`Network`, `Timeout`, `RateLimited`) with
//! exponential backoff; nothing above it retries.

pub mod api;
mod changeset;
pub mod codec;
mod config;
mod error;
mod factory;
mod http_client;
mod interface;
mod rrset;
mod rrsets;
mod types;
mod utils;
mod zones;

// Re-export error types
pub use error::{ApiError, ApiResult, ProviderError, Result};

// Re-export configuration
pub use config::{AzureDnsConfig, ConfigError};

// Re-export factory functions
pub use factory::{create_provider, create_provider_with_token_source};

// Re-export the remote client contract
pub use api::{CancelSignal, DnsApi, WriteCondition};

// Re-export the provider model
pub use changeset::ResourceRecordChangeset;
pub use interface::{Interface, PROVIDER_NAME};
pub use rrset::ResourceRecordSet;
pub use rrsets::ResourceRecordSets;
pub use types::{Listing, RrsType};
pub use zones::{Zone, ZoneSettings, Zones};
