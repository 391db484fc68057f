use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),
}

impl From<crate::identity::IdentityError> for RoutingError {
    fn from(e: crate::identity::IdentityError) -> Self {
        RoutingError::MalformedIdentifier(e.to_string())
    }
}

pub type RoutingResult<T> = Result<T, RoutingError>;
