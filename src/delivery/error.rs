use crate::delivery::types::DeliveryState;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Message not found: {0}")]
    NotFound(Uuid),

    #[error("Message already tracked: {0}")]
    AlreadyTracked(Uuid),

    #[error("Invalid state transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: DeliveryState,
        to: DeliveryState,
    },

    #[error("Delivery tracker is shutting down")]
    ShuttingDown,

    #[error("Routed resolution requires a Tokio runtime")]
    NoRuntime,
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;
