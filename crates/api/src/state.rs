use std::sync::Arc;

use crate::advisor::RoutingAdvisor;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: civitrack_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<civitrack_events::EventBus>,
    /// Routing advisor used at report submission.
    pub advisor: Arc<RoutingAdvisor>,
}
