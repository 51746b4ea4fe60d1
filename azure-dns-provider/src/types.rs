use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

// ============ Record Types ============

/// Resource record set type.
///
/// The supported set is closed: every conversion site matches on it
/// exhaustively, so adding a variant forces the codec to handle it.
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RrsType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
}

impl RrsType {
    /// All supported record types.
    pub const ALL: [Self; 3] = [Self::A, Self::Aaaa, Self::Cname];

    /// The bare type tag used on the wire when writing (`"A"`, `"AAAA"`, `"CNAME"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
        }
    }
}

impl fmt::Display for RrsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RrsType {
    type Err = ProviderError;

    /// Parse a bare type tag. Use [`codec::parse_type`](crate::codec::parse_type)
    /// for namespaced tags returned by the API.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            _ => Err(ProviderError::UnsupportedRecordType {
                record_type: s.to_string(),
            }),
        }
    }
}

// ============ Listing ============

/// One bounded page of a remote listing.
///
/// The remote API is asked for at most `page_size` items and further pages
/// are never fetched. `truncated` reports that the remote signalled more
/// results than were returned.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    /// Items in the page.
    pub items: Vec<T>,
    /// Maximum number of items requested.
    pub page_size: u32,
    /// Whether the remote reported further items beyond this page.
    pub truncated: bool,
}

impl<T> Listing<T> {
    /// Create a listing.
    pub fn new(items: Vec<T>, page_size: u32, truncated: bool) -> Self {
        Self {
            items,
            page_size,
            truncated,
        }
    }
}
