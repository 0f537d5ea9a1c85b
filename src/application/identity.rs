//! Token-to-user resolution boundary.
//!
//! User identity is owned by an external service reachable at the site's
//! auth endpoint; this crate only ever stores the opaque user id it hands
//! back.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("auth token rejected by identity service")]
    Unauthorized,
    #[error("identity service unreachable: {0}")]
    Unreachable(String),
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_user_id(&self, auth_url: &str, token: &str)
    -> Result<String, IdentityError>;
}
