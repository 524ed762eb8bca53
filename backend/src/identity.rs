//! Client for the external identity backend.
//!
//! The backend owns credential verification and the whole account
//! lifecycle; this crate only forwards operations and surfaces the
//! backend's message when one is refused. Handlers depend on the
//! [`IdentityBackend`] trait so tests can substitute a stub.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use common::UserProfile;

use crate::config::IdentityConfig;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The backend refused the operation (bad credentials, duplicate
    /// account, weak password, ...). Carries the backend's own message.
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached or answered something
    /// unparseable.
    #[error("The account service is currently unavailable")]
    Unavailable(#[from] reqwest::Error),
}

/// A successful login or registration: the backend token and the
/// account snapshot it authenticates.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Operations the identity backend exposes. Every failure carries a
/// message fit for direct display to the visitor.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    async fn register(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    /// Resolves the account a token currently authenticates, or `None`
    /// if the token no longer maps to one.
    async fn current_user(&self, token: &str) -> Result<Option<UserProfile>, IdentityError>;

    async fn update_profile(
        &self,
        token: &str,
        display_name: &str,
        email: &str,
    ) -> Result<UserProfile, IdentityError>;

    async fn update_password(&self, token: &str, password: &str) -> Result<(), IdentityError>;

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError>;
}

/// HTTP implementation against the backend's JSON REST surface.
pub struct HttpIdentityBackend {
    client: reqwest::Client,
    config: IdentityConfig,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpIdentityBackend {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Converts a non-success response into the backend's own message,
    /// falling back to a generic one when the body is not the expected
    /// shape.
    async fn rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => IdentityError::Rejected(body.message),
            Err(e) => {
                tracing::warn!(%status, error = %e, "unexpected error body from identity backend");
                IdentityError::Rejected("The account service rejected the request".to_string())
            }
        }
    }

    async fn expect_session(response: reqwest::Response) -> Result<AuthSession, IdentityError> {
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let body: SessionResponse = response.json().await?;
        Ok(AuthSession {
            token: body.token,
            user: body.user,
        })
    }
}

#[async_trait]
impl IdentityBackend for HttpIdentityBackend {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let response = self
            .client
            .post(self.url("/v1/sessions"))
            .header("x-api-key", &self.config.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::expect_session(response).await
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let response = self
            .client
            .post(self.url("/v1/accounts"))
            .header("x-api-key", &self.config.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::expect_session(response).await
    }

    async fn current_user(&self, token: &str) -> Result<Option<UserProfile>, IdentityError> {
        let response = self
            .client
            .get(self.url("/v1/me"))
            .header("x-api-key", &self.config.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        // An expired or revoked token is an anonymous visitor, not an error.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::NOT_FOUND
        {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(Some(response.json::<UserProfile>().await?))
    }

    async fn update_profile(
        &self,
        token: &str,
        display_name: &str,
        email: &str,
    ) -> Result<UserProfile, IdentityError> {
        let response = self
            .client
            .patch(self.url("/v1/me"))
            .header("x-api-key", &self.config.api_key)
            .bearer_auth(token)
            .json(&serde_json::json!({ "display_name": display_name, "email": email }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json::<UserProfile>().await?)
    }

    async fn update_password(&self, token: &str, password: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .put(self.url("/v1/me/password"))
            .header("x-api-key", &self.config.api_key)
            .bearer_auth(token)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .delete(self.url("/v1/sessions/current"))
            .header("x-api-key", &self.config.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }
}
