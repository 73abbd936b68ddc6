use std::sync::Arc;

use swing_db::Store;
use swing_events::EventBus;

use crate::auth::identity::IdentityVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is an `Arc` or already shared.
#[derive(Clone)]
pub struct AppState {
    /// Repository bundle (in-memory or PostgreSQL).
    pub store: Store,
    pub config: Arc<ServerConfig>,
    /// Verifies third-party sign-in credentials.
    pub identity: Arc<dyn IdentityVerifier>,
    /// Event bus for platform events (votes, registrations, profiles).
    pub event_bus: Arc<EventBus>,
}
