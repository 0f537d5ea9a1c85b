//! HTTP adapter for the external identity service.
//!
//! The service lives at the site's auth endpoint; we exchange the caller's
//! opaque token for the opaque user id and store nothing else about users.

use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::identity::{IdentityError, IdentityResolver};

use super::error::InfraError;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    user_id: String,
}

pub struct HttpIdentityResolver {
    client: Client,
}

impl HttpIdentityResolver {
    pub fn new(request_timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build identity client: {err}"))
            })?;
        Ok(Self { client })
    }
}

fn endpoint(auth_url: &str) -> String {
    // Site records store URL-like strings; bare hosts get a scheme here.
    if auth_url.starts_with("http://") || auth_url.starts_with("https://") {
        auth_url.to_string()
    } else {
        format!("https://{auth_url}")
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn resolve_user_id(
        &self,
        auth_url: &str,
        token: &str,
    ) -> Result<String, IdentityError> {
        let response = self
            .client
            .post(endpoint(auth_url))
            .json(&TokenRequest { token })
            .send()
            .await
            .map_err(|err| {
                counter!("prefstore_identity_failure_total").increment(1);
                IdentityError::Unreachable(err.to_string())
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::Unauthorized)
            }
            status if !status.is_success() => {
                counter!("prefstore_identity_failure_total").increment(1);
                Err(IdentityError::Unreachable(format!(
                    "identity service answered {status}"
                )))
            }
            _ => {
                let body: TokenResponse = response.json().await.map_err(|err| {
                    counter!("prefstore_identity_failure_total").increment(1);
                    IdentityError::Unreachable(err.to_string())
                })?;
                Ok(body.user_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_a_scheme() {
        assert_eq!(endpoint("identity.foo.com"), "https://identity.foo.com");
        assert_eq!(
            endpoint("http://identity.local/whoami"),
            "http://identity.local/whoami"
        );
    }
}
