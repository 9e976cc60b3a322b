use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{field}' has the wrong kind: expected {expected}, got {got}")]
    WrongFieldKind {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid recommendation count: {0} (must be at least 1)")]
    InvalidLimit(usize),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    #[error("Non-finite value in {0}")]
    NonFinite(String),
}

/// Coarse error classes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    ArtifactMismatch,
    Computation,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingField(_)
            | Error::WrongFieldKind { .. }
            | Error::InvalidDimension { .. }
            | Error::InvalidLimit(_) => ErrorKind::Validation,
            Error::ItemNotFound(_) => ErrorKind::NotFound,
            Error::ArtifactMismatch(_) => ErrorKind::ArtifactMismatch,
            Error::NonFinite(_) => ErrorKind::Computation,
        }
    }

    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        Error::ArtifactMismatch(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::MissingField("Genre".into()).kind(), ErrorKind::Validation);
        assert_eq!(
            Error::InvalidDimension { expected: 3, actual: 2 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::ItemNotFound("Tetris".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::mismatch("rows").kind(), ErrorKind::ArtifactMismatch);
        assert_eq!(Error::NonFinite("query".into()).kind(), ErrorKind::Computation);
    }
}
