//! HTTP auth backend.

use async_trait::async_trait;
use tracing::instrument;

use leveltest_auth::context::{AuthBackend, AuthResponse, Credentials, Registration};
use leveltest_core::error::ApiError;

use crate::config::ClientConfig;
use crate::{error_message, transport_error};

/// Auth backend over the platform's `/login`, `/register`, and `/user`
/// endpoints.
pub struct HttpAuthBackend {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpAuthBackend {
    pub fn new(config: &ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            client,
        }
    }

    async fn auth_request<B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(ApiError::Auth(error_message(response).await));
        }
        if status >= 400 {
            return Err(ApiError::Server {
                status,
                message: error_message(response).await,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(format!("failed to parse auth response: {e}")))
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.auth_request("/login", credentials).await
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.auth_request("/register", registration).await
    }

    #[instrument(skip(self, token))]
    async fn current_user(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(ApiError::Auth(error_message(response).await));
        }
        if status >= 400 {
            return Err(ApiError::Server {
                status,
                message: error_message(response).await,
            });
        }
        Ok(())
    }
}
