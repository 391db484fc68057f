use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unsupported frame type: {0}")]
    UnsupportedType(String),

    #[error("malformed frame: {0}")]
    Syntax(String),
}

impl FrameError {
    /// Name of the offending field, when the error is about one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FrameError::MissingField(field) | FrameError::InvalidField { field, .. } => {
                Some(*field)
            }
            _ => None,
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            FrameError::MissingField(_) => "missing_field",
            FrameError::InvalidField { .. } => "invalid_field",
            FrameError::UnsupportedType(_) => "unsupported_type",
            FrameError::Syntax(_) => "syntax",
        }
    }
}

pub type FrameResult<T> = Result<T, FrameError>;
