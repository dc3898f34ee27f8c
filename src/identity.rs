use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{models::User, repository::RepositoryState};

/// AuthError
///
/// Failure modes of a credential check. Only `InvalidCredentials` is a user error; the
/// caller must not create a session in either case.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// IdentityProvider Contract
///
/// Verifies a credential pair and resolves it to a portal user. Swappable between the
/// seeded directory (default) and an external identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError>;
}

pub type IdentityState = Arc<dyn IdentityProvider>;

/// DirectoryIdentityProvider
///
/// Checks credentials against the users held by the repository. Every directory account
/// shares one password; email matching is case-insensitive.
pub struct DirectoryIdentityProvider {
    repo: RepositoryState,
    shared_password: String,
}

impl DirectoryIdentityProvider {
    pub fn new(repo: RepositoryState, shared_password: impl Into<String>) -> Self {
        Self {
            repo,
            shared_password: shared_password.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for DirectoryIdentityProvider {
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.repo.find_user_by_email(email).await {
            Some(user) if password == self.shared_password => Ok(user),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Minimal shape of the external service's password-grant response.
#[derive(Deserialize)]
struct RemoteTokenResponse {
    user: RemoteUser,
}

#[derive(Deserialize)]
struct RemoteUser {
    email: String,
}

/// RemoteIdentityProvider
///
/// Delegates the password check to an external identity service
/// (`POST {base_url}/auth/v1/token?grant_type=password`), then maps the confirmed email to the
/// local directory entry that carries the portal role.
pub struct RemoteIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    repo: RepositoryState,
}

impl RemoteIdentityProvider {
    pub fn new(base_url: &str, api_key: Option<String>, repo: RepositoryState) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            repo,
        }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);

        let mut request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "email": email, "password": password }));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthError::Unavailable(format!("status {}", status)));
        }

        let body = response
            .json::<RemoteTokenResponse>()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        // Authenticated upstream but unknown here: no portal role to grant.
        self.repo
            .find_user_by_email(&body.user.email)
            .await
            .ok_or(AuthError::InvalidCredentials)
    }
}
