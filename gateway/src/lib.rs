//! HTTP gateway gluing the dashboard's sign-in flow to its hosted providers.
//!
//! The gateway owns no data of its own: sessions live in the hosted auth
//! provider, analytics and email are SaaS integrations that degrade to no-ops
//! when unconfigured. What lives here is the callback redirect policy and the
//! cookies it sets.

pub mod config;
pub mod cookies;
pub mod environment;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod supabase;

use std::sync::Arc;

use events::server::Analytics;

use crate::config::AppConfig;
use crate::supabase::SessionStore;

/// Shared state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<dyn SessionStore>,
    pub analytics: Analytics,
}
