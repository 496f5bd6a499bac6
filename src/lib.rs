pub mod access;
pub mod backend;
pub mod citation;
pub mod config;
pub mod convert;
pub mod error;
pub mod session;

pub use access::DomainAllowList;
pub use backend::{SearchBackend, SessionHandle};
pub use citation::{
    RenderMode, RenderOptions, UnresolvedMarkers, normalize_uri, render, rewrite_references,
};
pub use config::{BackendKind, Settings};
pub use convert::{AnswerPayload, GenerationOptions, Reference};
pub use error::DiscoveryError;
pub use session::ChatSession;

#[cfg(feature = "backend-answer")]
pub use backend::answer::AnswerBackend;
#[cfg(feature = "backend-converse")]
pub use backend::converse::ConverseBackend;

use async_trait::async_trait;

/// A Discovery Engine client for whichever search surface is configured.
///
/// This enum wraps the specific backend implementation and delegates method
/// calls to it. Use feature flags to enable specific backends.
pub enum DiscoveryClient {
    #[cfg(feature = "backend-converse")]
    /// Conversations answered with cited summaries.
    Converse(ConverseBackend),
    #[cfg(feature = "backend-answer")]
    /// Sessions answered by the Answer API.
    Answer(AnswerBackend),
}

macro_rules! dispatch {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            #[cfg(feature = "backend-converse")]
            DiscoveryClient::Converse(b) => b.$method($($arg),*).await,
            #[cfg(feature = "backend-answer")]
            DiscoveryClient::Answer(b) => b.$method($($arg),*).await,
            #[cfg(not(any(feature = "backend-converse", feature = "backend-answer")))]
            _ => unreachable!("no backend feature enabled"),
        }
    };
}

impl DiscoveryClient {
    /// Connects the backend named by `settings.backend` using Application
    /// Default Credentials.
    ///
    /// # Arguments
    ///
    /// * `settings` - Project, location and data store to query, plus the backend to use.
    ///
    /// # Returns
    ///
    /// * `Result<DiscoveryClient, DiscoveryError>` - The connected client, or a `Config` error
    ///   when the requested backend is not compiled in, or an `Auth` error when no
    ///   credentials are available.
    pub async fn from_settings(settings: &Settings) -> Result<Self, DiscoveryError> {
        match settings.backend {
            #[cfg(feature = "backend-converse")]
            BackendKind::Converse => {
                Ok(DiscoveryClient::Converse(ConverseBackend::new(settings).await?))
            }
            #[cfg(feature = "backend-answer")]
            BackendKind::Answer => Ok(DiscoveryClient::Answer(AnswerBackend::new(settings).await?)),
            #[allow(unreachable_patterns)]
            other => Err(DiscoveryError::Config(format!(
                "search backend {other:?} is not enabled in this build"
            ))),
        }
    }
}

#[async_trait]
impl SearchBackend for DiscoveryClient {
    async fn start_session(&self) -> Result<SessionHandle, DiscoveryError> {
        dispatch!(self, start_session)
    }

    async fn ask(
        &self,
        session: &SessionHandle,
        query: &str,
    ) -> Result<AnswerPayload, DiscoveryError> {
        dispatch!(self, ask, session, query)
    }
}
