//! Resource record set view

use crate::api::types::RecordSet;
use crate::codec::{self, parse_type};
use crate::error::Result;
use crate::rrsets::ResourceRecordSets;
use crate::types::RrsType;
use crate::utils::names::{APEX, relative_to_full_name};

/// Provider-neutral view over one Azure record set.
///
/// Borrowed from the [`Zone`](crate::Zone) it belongs to; the wire record is
/// kept as-is and decoded on access, so record sets of unsupported types are
/// still listed and only fail when their type or data is read.
#[derive(Debug, Clone)]
pub struct ResourceRecordSet<'z> {
    record: RecordSet,
    rrsets: ResourceRecordSets<'z>,
}

impl<'z> ResourceRecordSet<'z> {
    pub(crate) fn new(record: RecordSet, rrsets: ResourceRecordSets<'z>) -> Self {
        Self { record, rrsets }
    }

    /// Fully-qualified name, without trailing dot. The apex record set
    /// reports the zone name.
    pub fn name(&self) -> String {
        relative_to_full_name(self.relative_name(), self.rrsets.zone().name())
    }

    /// Zone-relative name (`"@"` for the apex).
    pub fn relative_name(&self) -> &str {
        self.record.name.as_deref().unwrap_or(APEX)
    }

    /// TTL in seconds; `0` when unset.
    pub fn ttl(&self) -> u32 {
        self.record
            .properties
            .as_ref()
            .and_then(|p| p.ttl)
            .and_then(|ttl| u32::try_from(ttl).ok())
            .unwrap_or(0)
    }

    pub fn rrs_type(&self) -> Result<RrsType> {
        parse_type(self.record.record_type.as_deref().unwrap_or_default())
    }

    /// Record data as strings, e.g. address literals or the CNAME target.
    pub fn rrdatas(&self) -> Result<Vec<String>> {
        let rrs_type = self.rrs_type()?;
        Ok(codec::decode(self.record.properties.as_ref(), rrs_type))
    }

    /// Concurrency token of the stored record set; `None` before it is saved.
    pub fn etag(&self) -> Option<&str> {
        self.record.etag.as_deref()
    }

    /// The underlying wire record.
    pub fn record_set(&self) -> &RecordSet {
        &self.record
    }

    pub fn resource_record_sets(&self) -> ResourceRecordSets<'z> {
        self.rrsets
    }

    /// Type and request body for a create-or-update call.
    ///
    /// The data is re-encoded, so empty or invalid data fails here before
    /// anything is sent.
    pub(crate) fn to_write_body(&self) -> Result<(RrsType, RecordSet)> {
        let rrs_type = self.rrs_type()?;
        let mut properties = codec::encode(rrs_type, &self.rrdatas()?)?;
        properties.ttl = Some(i64::from(self.ttl()));
        properties.metadata = self
            .record
            .properties
            .as_ref()
            .and_then(|p| p.metadata.clone());

        Ok((
            rrs_type,
            RecordSet {
                properties: Some(properties),
                ..Default::default()
            },
        ))
    }
}
