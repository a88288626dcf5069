//! Per-connection session state
//!
//! The session moves through `Uninitialized -> Initialized -> Ready`:
//! `initialize` resolves the linter configuration, and the background
//! `workspace/configuration` pull started by `initialized` stores the
//! client settings.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::linter::LinterConfig;
use crate::lsp::documents::DocumentStore;

/// Client settings for the configuration section
pub type ServerConfig = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session is not initialized; linter configuration is unavailable")]
    NotInitialized,
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initialized {
        linter_config: Arc<LinterConfig>,
    },
    Ready {
        linter_config: Arc<LinterConfig>,
        server_config: Arc<ServerConfig>,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized { .. } => "initialized",
            SessionState::Ready { .. } => "ready",
        }
    }
}

/// Converts the first `workspace/configuration` item into a settings map
///
/// Clients answer `null` for unknown sections; anything that is not an object
/// yields empty settings.
pub fn server_config_from_items(items: Vec<Value>) -> ServerConfig {
    match items.into_iter().next() {
        Some(Value::Object(map)) => map,
        _ => ServerConfig::new(),
    }
}

#[derive(Default)]
pub struct Session {
    state: RwLock<SessionState>,
    documents: DocumentStore,
    config_task: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Stores the resolved linter configuration (`Uninitialized -> Initialized`)
    pub async fn initialize(&self, linter_config: LinterConfig) {
        let mut state = self.state.write().await;
        *state = SessionState::Initialized {
            linter_config: Arc::new(linter_config),
        };
        debug!("Session {}", state.name());
    }

    /// Stores the client settings (`Initialized -> Ready`)
    pub async fn set_server_config(&self, server_config: ServerConfig) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let linter_config = match &*state {
            SessionState::Uninitialized => return Err(SessionError::NotInitialized),
            SessionState::Initialized { linter_config }
            | SessionState::Ready { linter_config, .. } => linter_config.clone(),
        };
        *state = SessionState::Ready {
            linter_config,
            server_config: Arc::new(server_config),
        };
        debug!("Session {}", state.name());
        Ok(())
    }

    pub async fn linter_config(&self) -> Result<Arc<LinterConfig>, SessionError> {
        match &*self.state.read().await {
            SessionState::Uninitialized => Err(SessionError::NotInitialized),
            SessionState::Initialized { linter_config }
            | SessionState::Ready { linter_config, .. } => Ok(linter_config.clone()),
        }
    }

    /// Client settings, empty until the session is ready
    pub async fn server_config(&self) -> Arc<ServerConfig> {
        match &*self.state.read().await {
            SessionState::Ready { server_config, .. } => server_config.clone(),
            _ => Arc::new(ServerConfig::new()),
        }
    }

    /// Tracks the background configuration pull so it can be cancelled on shutdown
    pub async fn set_config_task(&self, task: JoinHandle<()>) {
        if let Some(previous) = self.config_task.lock().await.replace(task) {
            previous.abort();
        }
    }

    /// Aborts a configuration pull that is still waiting on the client
    pub async fn cancel_pending(&self) {
        if let Some(task) = self.config_task.lock().await.take()
            && !task.is_finished()
        {
            debug!("Cancelling pending configuration request");
            task.abort();
        }
    }
}
