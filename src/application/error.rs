use thiserror::Error;

use crate::domain::error::KindError;
use crate::domain::kinds::Kind;

use super::identity::IdentityError;
use super::repos::RepoError;

/// Domain failures surfaced by the stores and the resolver. The HTTP layer
/// maps these onto the JSON error envelope; nothing here knows about
/// transports.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown site `{site_url}`")]
    UnknownSite { site_url: String },
    #[error("unknown preference key `{key}`")]
    InvalidKey { key: String },
    #[error("Expected {kind} for key {key}")]
    TypeMismatch { kind: Kind, key: String },
    #[error("stored value for key `{key}` no longer deserializes: {source}")]
    Corrupt { key: String, source: KindError },
    #[error(transparent)]
    Auth(#[from] IdentityError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl AppError {
    pub fn unknown_site(site_url: impl Into<String>) -> Self {
        Self::UnknownSite {
            site_url: site_url.into(),
        }
    }

    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    pub fn type_mismatch(kind: Kind, key: impl Into<String>) -> Self {
        Self::TypeMismatch {
            kind,
            key: key.into(),
        }
    }

    pub fn corrupt(key: impl Into<String>, source: KindError) -> Self {
        Self::Corrupt {
            key: key.into(),
            source,
        }
    }
}
