//! Gateway state
//!
//! Application state for the gateway server.

use crate::broadcast::Broadcaster;
use crate::connection::ConnectionManager;
use crate::registry::RoomRegistry;
use relay_common::AppConfig;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Every live WebSocket connection
    connection_manager: Arc<ConnectionManager>,
    /// Room membership
    registry: Arc<RoomRegistry>,
    /// Room fan-out over `registry`
    broadcaster: Arc<Broadcaster>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state with an empty registry
    pub fn new(config: AppConfig) -> Self {
        let registry = RoomRegistry::new_shared();
        let broadcaster = Broadcaster::new(registry.clone(), config.relay.send_timeout());

        Self {
            connection_manager: ConnectionManager::new_shared(),
            registry,
            broadcaster: Arc::new(broadcaster),
            config: Arc::new(config),
        }
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    /// Get the room registry
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Get the broadcaster
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("registry", &self.registry)
            .field("config", &"AppConfig")
            .finish()
    }
}
