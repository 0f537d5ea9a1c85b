use thiserror::Error;

/// Failures while moving a preference value across its serialized boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KindError {
    #[error("value is not a valid {expected}")]
    Type { expected: &'static str },
    #[error("malformed {expected} payload: {message}")]
    Decode {
        expected: &'static str,
        message: String,
    },
}

impl KindError {
    pub fn type_mismatch(expected: &'static str) -> Self {
        Self::Type { expected }
    }

    pub fn decode(expected: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            expected,
            message: message.into(),
        }
    }
}
