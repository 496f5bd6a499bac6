use std::sync::Arc;

use gcp_auth::TokenProvider;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::error::DiscoveryError;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Authenticated JSON transport to one Discovery Engine API version.
pub(crate) struct RestClient {
    client: Client,
    auth: Arc<dyn TokenProvider>,
    base_url: String,
}

impl RestClient {
    pub(crate) fn new(settings: &Settings, version: &str, auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: format!("https://{}/{}", settings.api_host(), version),
        }
    }

    /// Application Default Credentials.
    pub(crate) async fn default_provider() -> Result<Arc<dyn TokenProvider>, DiscoveryError> {
        gcp_auth::provider()
            .await
            .map_err(|e| DiscoveryError::Auth(e.to_string()))
    }

    pub(crate) fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    async fn get_token(&self) -> Result<String, DiscoveryError> {
        let token = self
            .auth
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| DiscoveryError::Auth(e.to_string()))?;
        Ok(token.as_str().to_string())
    }

    pub(crate) async fn post<B, R>(&self, resource: &str, body: &B) -> Result<R, DiscoveryError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(resource);
        let token = self.get_token().await?;

        tracing::debug!(%url, "POST");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(|e| DiscoveryError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            tracing::warn!(%url, status = status.as_u16(), "Discovery Engine request failed");
            return Err(DiscoveryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| DiscoveryError::Http(e.to_string()))?;
        Ok(serde_json::from_str(&text)?)
    }
}
