//! Record codec
//!
//! Converts between the flat `(type, data[])` view of a record set and the
//! nested per-type body of the Azure DNS API.

use std::collections::HashSet;

use crate::api::types::{ARecord, AaaaRecord, CnameRecord, RecordSetProperties};
use crate::error::{ProviderError, Result};
use crate::types::RrsType;

/// Namespace prefix the API puts in front of record set type tags on read.
pub const TYPE_PREFIX: &str = "Microsoft.Network/dnszones/";

/// Record data of one record set, typed per record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// IPv4 address literals, without duplicates.
    A(Vec<String>),
    /// IPv6 address literals, without duplicates.
    Aaaa(Vec<String>),
    /// Canonical name target; `None` when the remote body carries none.
    Cname(Option<String>),
}

impl RecordData {
    /// Build typed record data from caller-supplied strings.
    ///
    /// Address lists keep the first occurrence of each literal. A CNAME takes
    /// exactly one target.
    pub fn from_rrdatas(rrs_type: RrsType, rrdatas: &[String]) -> Result<Self> {
        if rrdatas.is_empty() {
            return Err(ProviderError::InvalidRecordData {
                record_type: rrs_type.to_string(),
                detail: "record data must not be empty".to_string(),
            });
        }

        match rrs_type {
            RrsType::A => Ok(Self::A(dedupe(rrdatas))),
            RrsType::Aaaa => Ok(Self::Aaaa(dedupe(rrdatas))),
            RrsType::Cname => match rrdatas {
                [target] => Ok(Self::Cname(Some(target.clone()))),
                _ => Err(ProviderError::InvalidRecordData {
                    record_type: rrs_type.to_string(),
                    detail: format!("expected exactly one target, got {}", rrdatas.len()),
                }),
            },
        }
    }

    /// Read typed record data out of a remote body.
    ///
    /// A missing body, or a body without the array for `rrs_type`, yields
    /// empty data.
    pub fn from_properties(rrs_type: RrsType, props: Option<&RecordSetProperties>) -> Self {
        match rrs_type {
            RrsType::A => Self::A(
                props
                    .and_then(|p| p.a_records.as_deref())
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|r| r.ipv4_address.clone())
                    .collect(),
            ),
            RrsType::Aaaa => Self::Aaaa(
                props
                    .and_then(|p| p.aaaa_records.as_deref())
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|r| r.ipv6_address.clone())
                    .collect(),
            ),
            RrsType::Cname => Self::Cname(
                props
                    .and_then(|p| p.cname_record.as_ref())
                    .and_then(|c| c.cname.clone()),
            ),
        }
    }

    /// The record type of this data.
    pub fn record_type(&self) -> RrsType {
        match self {
            Self::A(_) => RrsType::A,
            Self::Aaaa(_) => RrsType::Aaaa,
            Self::Cname(_) => RrsType::Cname,
        }
    }

    /// Write the data into a remote body. TTL and metadata are left unset.
    pub fn into_properties(self) -> RecordSetProperties {
        match self {
            Self::A(addresses) => RecordSetProperties {
                a_records: Some(
                    addresses
                        .into_iter()
                        .map(|a| ARecord {
                            ipv4_address: Some(a),
                        })
                        .collect(),
                ),
                ..Default::default()
            },
            Self::Aaaa(addresses) => RecordSetProperties {
                aaaa_records: Some(
                    addresses
                        .into_iter()
                        .map(|a| AaaaRecord {
                            ipv6_address: Some(a),
                        })
                        .collect(),
                ),
                ..Default::default()
            },
            Self::Cname(target) => RecordSetProperties {
                cname_record: Some(CnameRecord { cname: target }),
                ..Default::default()
            },
        }
    }

    /// Flatten back into the neutral string list.
    pub fn into_rrdatas(self) -> Vec<String> {
        match self {
            Self::A(addresses) | Self::Aaaa(addresses) => addresses,
            Self::Cname(target) => target.into_iter().collect(),
        }
    }
}

/// Parse a type tag as returned by the API, with or without the
/// `Microsoft.Network/dnszones/` prefix.
pub fn parse_type(tag: &str) -> Result<RrsType> {
    let bare = tag
        .get(..TYPE_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(TYPE_PREFIX))
        .map_or(tag, |_| &tag[TYPE_PREFIX.len()..]);
    bare.parse()
}

/// Encode neutral record data into the remote body for `rrs_type`.
pub fn encode(rrs_type: RrsType, rrdatas: &[String]) -> Result<RecordSetProperties> {
    Ok(RecordData::from_rrdatas(rrs_type, rrdatas)?.into_properties())
}

/// Decode the remote body for `rrs_type` into neutral record data.
pub fn decode(props: Option<&RecordSetProperties>, rrs_type: RrsType) -> Vec<String> {
    RecordData::from_properties(rrs_type, props).into_rrdatas()
}

/// Remove duplicate literals, keeping the first occurrence of each.
fn dedupe(rrdatas: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    rrdatas
        .iter()
        .filter(|d| seen.insert(d.as_str()))
        .cloned()
        .collect()
}
