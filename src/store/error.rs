use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Message not found: {0}")]
    NotFound(Uuid),

    #[error("Message already stored: {0}")]
    Duplicate(Uuid),
}

pub type StoreResult<T> = Result<T, StoreError>;
