//! Data Atlas HTTP API.
//!
//! Axum handlers over the [`atlas_core`] catalog, search pipeline and session store.
//! [`router`] returns a fully stated `Router`; binaries add tower layers and static
//! file serving on top.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/health` | [`api::api_health`] |
//! | POST | `/api/search` | [`api::api_search`] |
//! | GET | `/api/datasets` | [`api::api_datasets`] |
//! | GET | `/api/dataset/{id}` | [`api::api_dataset`] |
//! | POST, DELETE | `/api/dataset/{id}/save` | [`api::api_save_dataset`], [`api::api_unsave_dataset`] |
//! | POST | `/api/login`, `/api/signup`, `/api/logout` | mock auth |
//! | GET, PATCH | `/api/profile` | [`api::api_profile`], [`api::api_update_profile`] |

pub mod api;
pub mod auth;
pub mod error;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use atlas_core::boost::RelevanceBooster;
use atlas_core::catalog::Catalog;
use atlas_core::session::SessionStore;

use api::*;

/// Pre-serialized JSON responses, computed once at startup.
pub struct HttpCache {
    pub datasets_json: String,
}

impl HttpCache {
    pub fn build(catalog: &Catalog) -> Result<Self, serde_json::Error> {
        Ok(Self { datasets_json: serde_json::to_string(catalog.all_datasets())? })
    }
}

/// Axum application state.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<Catalog>,
    pub booster: Arc<dyn RelevanceBooster>,
    pub sessions: Arc<SessionStore>,
    pub cache: Arc<HttpCache>,
    /// Artificial delay applied to data endpoints.
    pub latency: Duration,
    pub start_time: Instant,
}

impl AppContext {
    pub fn new(
        catalog: Catalog,
        booster: Arc<dyn RelevanceBooster>,
        latency: Duration,
    ) -> Result<Self, serde_json::Error> {
        let cache = HttpCache::build(&catalog)?;
        Ok(Self {
            catalog: Arc::new(catalog),
            booster,
            sessions: Arc::new(SessionStore::new()),
            cache: Arc::new(cache),
            latency,
            start_time: Instant::now(),
        })
    }
}

/// Build the API router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(api_health))
        .route("/api/search", post(api_search))
        .route("/api/datasets", get(api_datasets))
        .route("/api/dataset/{id}", get(api_dataset))
        .route("/api/dataset/{id}/save", post(api_save_dataset).delete(api_unsave_dataset))
        .route("/api/login", post(api_login))
        .route("/api/signup", post(api_signup))
        .route("/api/logout", post(api_logout))
        .route("/api/profile", get(api_profile).patch(api_update_profile))
        .with_state(ctx)
}
