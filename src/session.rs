use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::{SearchBackend, SessionHandle};
use crate::citation::{RenderOptions, render};
use crate::error::DiscoveryError;

/// State of one chat: the backend it talks to, the remote conversation that
/// carries its context, and how answers are rendered.
///
/// Each chat owns its own `ChatSession`; nothing is shared between chats
/// except the backend, which is stateless per request.
pub struct ChatSession {
    backend: Arc<dyn SearchBackend>,
    handle: RwLock<SessionHandle>,
    options: RenderOptions,
}

impl ChatSession {
    pub async fn start(
        backend: Arc<dyn SearchBackend>,
        options: RenderOptions,
    ) -> Result<Self, DiscoveryError> {
        let handle = backend.start_session().await?;
        Ok(Self {
            backend,
            handle: RwLock::new(handle),
            options,
        })
    }

    /// Sends a user message and returns the answer ready for display.
    pub async fn ask(&self, query: &str) -> Result<String, DiscoveryError> {
        let handle = self.handle.read().await.clone();
        let payload = self.backend.ask(&handle, query).await?;
        tracing::debug!(
            session = handle.name(),
            references = payload.references.as_ref().map(Vec::len),
            "received answer"
        );
        Ok(render(&payload, &self.options))
    }

    /// Replaces the remote conversation with a fresh one, dropping its context.
    pub async fn restart(&self) -> Result<(), DiscoveryError> {
        let handle = self.backend.start_session().await?;
        *self.handle.write().await = handle;
        Ok(())
    }

    pub async fn handle(&self) -> SessionHandle {
        self.handle.read().await.clone()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}
