//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::ConnectionSettings;
use crate::domain::SessionRegistry;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry of live game sessions.
    pub registry: Arc<SessionRegistry>,
    /// Timeouts applied to each WebSocket connection.
    pub connection: ConnectionSettings,
}

impl AppState {
    /// Creates application state around an existing registry.
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>, connection: ConnectionSettings) -> Self {
        Self {
            registry,
            connection,
        }
    }
}
