//! Append-only message store
//!
//! Every accepted message is kept for the lifetime of the process and can be
//! queried by sender or recipient, newest first.

mod error;
mod store;
mod types;

pub use error::{StoreError, StoreResult};
pub use store::MessageStore;
pub use types::{Message, MessageFilter};
