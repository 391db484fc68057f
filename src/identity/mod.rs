//! Maritime resource names and the identity registry seam
//!
//! Every party on the relay is addressed by an MRN such as
//! `urn:mrn:mcp:vessel:imo:1234567`. The segment after the namespace names
//! the kind of entity, which is what routing keys off.

mod error;
mod registry;
mod types;

pub use error::{IdentityError, IdentityResult};
pub use registry::{EntityRecord, IdentityRegistry, OpenRegistry, StaticRegistry};
pub use types::{EntityType, Mrn};
