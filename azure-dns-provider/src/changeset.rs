//! Ordered record set changesets

use crate::api::WriteCondition;
use crate::error::{ProviderError, Result};
use crate::rrset::ResourceRecordSet;
use crate::rrsets::ResourceRecordSets;

/// A batch of record set changes for one zone.
///
/// Built by value (`add`, `remove` and `upsert` return the changeset) and
/// consumed by [`apply`](Self::apply). Changes are sent one at a time:
/// all removals, then all upserts, then all additions, each group in the
/// order it was queued. The first failure stops the batch; changes already
/// sent are not rolled back.
#[derive(Debug)]
#[must_use = "a changeset does nothing until applied"]
pub struct ResourceRecordChangeset<'z> {
    rrsets: ResourceRecordSets<'z>,
    additions: Vec<ResourceRecordSet<'z>>,
    removals: Vec<ResourceRecordSet<'z>>,
    upserts: Vec<ResourceRecordSet<'z>>,
}

/// Which list a change came from.
#[derive(Debug, Clone, Copy)]
enum ChangeKind {
    Removal,
    Upsert,
    Addition,
}

impl ChangeKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Removal => "removal",
            Self::Upsert => "upsert",
            Self::Addition => "addition",
        }
    }
}

impl<'z> ResourceRecordChangeset<'z> {
    pub(crate) fn new(rrsets: ResourceRecordSets<'z>) -> Self {
        Self {
            rrsets,
            additions: Vec::new(),
            removals: Vec::new(),
            upserts: Vec::new(),
        }
    }

    /// Create the record set; fails if it already exists.
    pub fn add(mut self, rrset: ResourceRecordSet<'z>) -> Self {
        self.additions.push(rrset);
        self
    }

    /// Delete the record set with this name and type.
    pub fn remove(mut self, rrset: ResourceRecordSet<'z>) -> Self {
        self.removals.push(rrset);
        self
    }

    /// Create the record set or replace it if it exists.
    pub fn upsert(mut self, rrset: ResourceRecordSet<'z>) -> Self {
        self.upserts.push(rrset);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.upserts.is_empty()
    }

    /// The collection this changeset belongs to.
    pub fn resource_record_sets(&self) -> ResourceRecordSets<'z> {
        self.rrsets
    }

    /// Send every change to the API, stopping at the first failure.
    pub async fn apply(self) -> Result<()> {
        let zone_name = self.rrsets.zone().name();
        log::debug!(
            "[azure-dns] Applying changeset to zone {zone_name}: {} removals, {} upserts, {} additions",
            self.removals.len(),
            self.upserts.len(),
            self.additions.len()
        );

        for rrset in &self.removals {
            self.remove_one(rrset).await?;
        }
        for rrset in &self.upserts {
            self.write_one(rrset, ChangeKind::Upsert, WriteCondition::unconditional())
                .await?;
        }
        for rrset in &self.additions {
            self.write_one(rrset, ChangeKind::Addition, WriteCondition::only_if_absent())
                .await?;
        }

        log::info!(
            "[azure-dns] Applied {} changes to zone {zone_name}",
            self.removals.len() + self.upserts.len() + self.additions.len()
        );
        Ok(())
    }

    /// Delete by name and type. The record data is not needed.
    async fn remove_one(&self, rrset: &ResourceRecordSet<'z>) -> Result<()> {
        let zone_name = self.rrsets.zone().name();
        let relative_name = rrset.relative_name();
        let rrs_type = rrset.rrs_type().map_err(ProviderError::logged)?;
        log::debug!(
            "[azure-dns] {} {rrs_type} {relative_name} in zone {zone_name}",
            ChangeKind::Removal.as_str()
        );

        self.rrsets
            .zone()
            .api()
            .delete_record_set(zone_name, relative_name, rrs_type, "")
            .await
            .map_err(|source| {
                ProviderError::RemoteDelete {
                    target: format!("{rrs_type} record set '{}'", rrset.name()),
                    source,
                }
                .logged()
            })
    }

    async fn write_one(
        &self,
        rrset: &ResourceRecordSet<'z>,
        kind: ChangeKind,
        condition: WriteCondition,
    ) -> Result<()> {
        let zone_name = self.rrsets.zone().name();
        let relative_name = rrset.relative_name();
        let (rrs_type, body) = rrset.to_write_body().map_err(ProviderError::logged)?;
        log::debug!(
            "[azure-dns] {} {rrs_type} {relative_name} in zone {zone_name}",
            kind.as_str()
        );

        self.rrsets
            .zone()
            .api()
            .create_or_update_record_set(zone_name, relative_name, rrs_type, &body, &condition)
            .await
            .map(|_| ())
            .map_err(|source| {
                ProviderError::write(format!("{rrs_type} record set '{}'", rrset.name()), source)
                    .logged()
            })
    }
}
