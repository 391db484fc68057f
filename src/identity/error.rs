use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Malformed identifier: {0}")]
    Malformed(String),

    #[error("Unknown identifier: {0}")]
    Unknown(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;
