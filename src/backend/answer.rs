use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::TokenProvider;

use super::rest::RestClient;
use super::{SearchBackend, SessionHandle};
use crate::config::Settings;
use crate::convert::answer::{
    AnswerQueryResponse, CreateSessionRequest, Session, build_answer_request,
    convert_answer_response,
};
use crate::convert::{AnswerPayload, GenerationOptions, generate_user_pseudo_id};
use crate::error::DiscoveryError;

const API_VERSION: &str = "v1beta";
const SERVING_CONFIG: &str = "default_serving_config";

/// Answer API: a remote session per chat, queried with `:answer`.
pub struct AnswerBackend {
    rest: RestClient,
    data_store: String,
    serving_config: String,
    generation: GenerationOptions,
}

impl AnswerBackend {
    /// Creates a backend authenticated with Application Default Credentials.
    ///
    /// # Arguments
    ///
    /// * `settings` - Project, location, data store and generation options.
    ///
    /// # Returns
    ///
    /// * `Result<AnswerBackend, DiscoveryError>` - The backend, or an `Auth` error.
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

    /// Answers a single query outside any session.
    ///
    /// # Arguments
    ///
    /// * `query` - The user's question.
    ///
    /// # Returns
    ///
    /// * `Result<AnswerPayload, DiscoveryError>` - Answer text with its references, ordered by
    ///   citation.
    pub async fn answer_once(&self, query: &str) -> Result<AnswerPayload, DiscoveryError> {
        self.answer(None, query).await
    }

    async fn answer(
        &self,
        session: Option<&str>,
        query: &str,
    ) -> Result<AnswerPayload, DiscoveryError> {
        let req = build_answer_request(query, session, &self.generation);
        let resource = format!("{}:answer", self.serving_config);
        let resp: AnswerQueryResponse = self.rest.post(&resource, &req).await?;
        Ok(convert_answer_response(&resp))
    }
}

#[async_trait]
impl SearchBackend for AnswerBackend {
    async fn start_session(&self) -> Result<SessionHandle, DiscoveryError> {
        let resource = format!("{}/sessions", self.data_store);
        let req = CreateSessionRequest {
            user_pseudo_id: generate_user_pseudo_id(),
        };
        let session: Session = self.rest.post(&resource, &req).await?;
        if session.name.is_empty() {
            return Err(DiscoveryError::UnexpectedResponse(
                "created session has no name".to_string(),
            ));
        }
        tracing::info!(session = %session.name, "started session");
        Ok(SessionHandle::new(session.name))
    }

    async fn ask(
        &self,
        session: &SessionHandle,
        query: &str,
    ) -> Result<AnswerPayload, DiscoveryError> {
        self.answer(Some(session.name()), query).await
    }
}
