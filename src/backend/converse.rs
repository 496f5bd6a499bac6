use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::TokenProvider;

use super::rest::RestClient;
use super::{SearchBackend, SessionHandle};
use crate::config::Settings;
use crate::convert::converse::{
    Conversation, ConverseResponse, build_converse_request, convert_converse_response,
};
use crate::convert::{AnswerPayload, GenerationOptions};
use crate::error::DiscoveryError;

const API_VERSION: &str = "v1";
const SERVING_CONFIG: &str = "default_config";

/// Conversational search: a remote conversation per chat, queried with
/// `:converse` and answered with a cited summary.
pub struct ConverseBackend {
    rest: RestClient,
    data_store: String,
    serving_config: String,
    generation: GenerationOptions,
}

impl ConverseBackend {
    /// Creates a backend authenticated with Application Default Credentials.
    ///
    /// # Arguments
    ///
    /// * `settings` - Project, location, data store and generation options.
    ///
    /// # Returns
    ///
    /// * `Result<ConverseBackend, DiscoveryError>` - The backend, or an `Auth` error.
    pub async fn new(settings: &Settings) -> Result<Self, DiscoveryError> {
        let auth = RestClient::default_provider().await?;
        Ok(Self::with_provider(settings, auth))
    }

    /// Creates a backend that takes its tokens from `auth`, e.g. a service account.
    pub fn with_provider(settings: &Settings, auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            rest: RestClient::new(settings, API_VERSION, auth),
            data_store: settings.data_store_path(),
            serving_config: settings.serving_config_path(SERVING_CONFIG),
            generation: settings.generation.clone(),
        }
    }
}

#[async_trait]
impl SearchBackend for ConverseBackend {
    async fn start_session(&self) -> Result<SessionHandle, DiscoveryError> {
        let resource = format!("{}/conversations", self.data_store);
        let conversation: Conversation =
            self.rest.post(&resource, &Conversation::default()).await?;
        if conversation.name.is_empty() {
            return Err(DiscoveryError::UnexpectedResponse(
                "created conversation has no name".to_string(),
            ));
        }
        tracing::info!(conversation = %conversation.name, "started conversation");
        Ok(SessionHandle::new(conversation.name))
    }

    async fn ask(
        &self,
        session: &SessionHandle,
        query: &str,
    ) -> Result<AnswerPayload, DiscoveryError> {
        let req = build_converse_request(query, &self.serving_config, &self.generation);
        let resource = format!("{}:converse", session.name());
        let resp: ConverseResponse = self.rest.post(&resource, &req).await?;
        Ok(convert_converse_response(&resp))
    }
}
