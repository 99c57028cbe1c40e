// Transport for the /user endpoints

use crate::auth::models::{CredentialsRequest, LoginResponse, MessageResponse, ProfileResponse};
use crate::client::error::ClientError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for a single request; nothing is retried
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Calls the auth endpoints on behalf of [`crate::client::AuthClient`]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, request: &CredentialsRequest) -> Result<MessageResponse, ClientError>;

    async fn login(&self, request: &CredentialsRequest) -> Result<LoginResponse, ClientError>;

    /// Ends the server cookie session, if any
    async fn logout(&self) -> Result<MessageResponse, ClientError>;

    async fn profile(&self, token: &str) -> Result<ProfileResponse, ClientError>;
}

/// HTTP implementation. Keeps a cookie jar so the session cookie set by
/// login is sent back on logout.
pub struct HttpAuthApi {
    http: Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Decode a success body, or turn a failure status into `Rejected`
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<MessageResponse>()
        .await
        .ok()
        .map(|body| body.message);
    Err(ClientError::Rejected { status, message })
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn register(&self, request: &CredentialsRequest) -> Result<MessageResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/user/register"))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn login(&self, request: &CredentialsRequest) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/user/login"))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn logout(&self) -> Result<MessageResponse, ClientError> {
        let response = self.http.post(self.url("/user/logout")).send().await?;
        read_json(response).await
    }

    async fn profile(&self, token: &str) -> Result<ProfileResponse, ClientError> {
        let response = self
            .http
            .get(self.url("/user/profile"))
            .bearer_auth(token)
            .send()
            .await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpAuthApi::new("http://localhost:8080/").unwrap();
        assert_eq!(api.url("/user/login"), "http://localhost:8080/user/login");
    }
}
