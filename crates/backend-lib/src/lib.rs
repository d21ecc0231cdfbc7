// ============================
// clawcontrol-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `ClawControl` admin server.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod store;
pub mod validation;

use crate::auth::{AuthService, DefaultAuth};
use crate::config::Settings;
use crate::middleware::RateLimitEntry;
use crate::store::Db;
use dashmap::DashMap;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// The document store
    pub db: Db,
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Per-client rate limit windows
    pub rate_limits: Arc<DashMap<String, RateLimitEntry>>,
}

impl AppState {
    /// Create a new application state over a store.
    pub fn new(db: Db, settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let auth = Arc::new(DefaultAuth::new(db.clone(), settings.clone()));

        Self {
            db,
            auth,
            settings,
            rate_limits: Arc::new(DashMap::new()),
        }
    }
}
