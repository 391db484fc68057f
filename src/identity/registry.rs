//! Identity registry collaborator
//!
//! The relay never owns registry data. It only asks whether an identifier is
//! known before admitting a connection or answering a routing query.

use crate::identity::error::{IdentityError, IdentityResult};
use crate::identity::types::{EntityType, Mrn};
use serde::Serialize;
use std::collections::HashMap;

/// Metadata a registry returns for a known identifier
#[derive(Debug, Clone, Serialize)]
pub struct EntityRecord {
    pub mrn: Mrn,
    pub name: String,
    pub entity_type: EntityType,
    pub organization_mrn: Option<Mrn>,
}

impl EntityRecord {
    pub fn new(mrn: Mrn, name: impl Into<String>) -> Self {
        let entity_type = mrn.entity_type();
        Self {
            mrn,
            name: name.into(),
            entity_type,
            organization_mrn: None,
        }
    }

    pub fn with_organization(mut self, org: Mrn) -> Self {
        self.organization_mrn = Some(org);
        self
    }
}

/// Read-only lookup of organization/service/vessel records
pub trait IdentityRegistry: Send + Sync {
    fn lookup(&self, mrn: &Mrn) -> Option<EntityRecord>;

    /// Fails with `Unknown` when the registry has no record for `mrn`
    fn validate(&self, mrn: &Mrn) -> IdentityResult<()> {
        match self.lookup(mrn) {
            Some(_) => Ok(()),
            None => Err(IdentityError::Unknown(mrn.to_string())),
        }
    }
}

/// Registry that knows every well-formed identifier
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenRegistry;

impl IdentityRegistry for OpenRegistry {
    fn lookup(&self, mrn: &Mrn) -> Option<EntityRecord> {
        Some(EntityRecord::new(mrn.clone(), mrn.as_str()))
    }
}

/// Fixed set of records, loaded once
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    records: HashMap<Mrn, EntityRecord>,
}

impl StaticRegistry {
    pub fn new(records: impl IntoIterator<Item = EntityRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.mrn.clone(), r)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IdentityRegistry for StaticRegistry {
    fn lookup(&self, mrn: &Mrn) -> Option<EntityRecord> {
        self.records.get(mrn).cloned()
    }
}
