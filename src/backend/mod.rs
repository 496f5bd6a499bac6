use async_trait::async_trait;

use crate::convert::AnswerPayload;
use crate::error::DiscoveryError;

#[cfg(any(feature = "backend-converse", feature = "backend-answer"))]
mod rest;

#[cfg(feature = "backend-converse")]
pub mod converse;

#[cfg(feature = "backend-answer")]
pub mod answer;

/// Resource name of a remote conversation or session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    name: String,
}

impl SessionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Opens a conversation or session that carries context between queries.
    async fn start_session(&self) -> Result<SessionHandle, DiscoveryError>;

    async fn ask(
        &self,
        session: &SessionHandle,
        query: &str,
    ) -> Result<AnswerPayload, DiscoveryError>;
}
