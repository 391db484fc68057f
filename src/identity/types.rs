use crate::identity::error::{IdentityError, IdentityResult};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Index of the entity-type segment: `urn:mrn:<namespace>:<entity>:...`
const ENTITY_SEGMENT: usize = 3;

/// A validated maritime resource name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mrn(String);

impl Mrn {
    /// Parse and validate an identifier
    pub fn parse(raw: impl Into<String>) -> IdentityResult<Self> {
        let raw = raw.into();
        let segments: Vec<&str> = raw.split(':').collect();

        if segments.len() <= ENTITY_SEGMENT {
            return Err(IdentityError::Malformed(format!(
                "{raw}: expected at least {} segments",
                ENTITY_SEGMENT + 1
            )));
        }
        if !segments[0].eq_ignore_ascii_case("urn") || !segments[1].eq_ignore_ascii_case("mrn") {
            return Err(IdentityError::Malformed(format!(
                "{raw}: must start with urn:mrn:"
            )));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(IdentityError::Malformed(format!("{raw}: empty segment")));
        }

        // The scheme prefix is case-insensitive; store it in one spelling so
        // equality and hashing agree with parsing.
        let canonical = format!("urn:mrn:{}", segments[2..].join(":"));
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace segment (e.g. `mcp`)
    pub fn namespace(&self) -> &str {
        self.segment(2)
    }

    pub fn entity_type(&self) -> EntityType {
        EntityType::from_segment(self.segment(ENTITY_SEGMENT))
    }

    fn segment(&self, index: usize) -> &str {
        // Validated in `parse`, so the index is always present.
        self.0.split(':').nth(index).unwrap_or_default()
    }
}

impl fmt::Display for Mrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Mrn {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Mrn {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Mrn> for String {
    fn from(mrn: Mrn) -> Self {
        mrn.0
    }
}

impl AsRef<str> for Mrn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of party an identifier names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityType {
    Vessel,
    Shore,
    Org,
    Service,
    Instance,
    Other(String),
}

impl EntityType {
    fn from_segment(segment: &str) -> Self {
        match segment.to_ascii_lowercase().as_str() {
            "vessel" => EntityType::Vessel,
            "shore" => EntityType::Shore,
            "org" => EntityType::Org,
            "service" => EntityType::Service,
            "instance" => EntityType::Instance,
            other => EntityType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Vessel => "vessel",
            EntityType::Shore => "shore",
            EntityType::Org => "org",
            EntityType::Service => "service",
            EntityType::Instance => "instance",
            EntityType::Other(name) => name,
        }
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
