//! Data Atlas core — dataset catalog and search pipeline.
//!
//! This crate holds everything that is not transport: the static catalog of dataset
//! records, the search/filter/rank/paginate pipeline shared by the HTTP API and the
//! CLI, the pluggable relevance booster, mock user sessions, and config loading.
//!
//! # Modules
//!
//! - [`types`] — Dataset records, analytics, search request/response, users
//! - [`catalog`] — Static reference data provider
//! - [`search`] — The search pipeline
//! - [`boost`] — Injectable description-boost scoring
//! - [`session`] — Mock login/signup and per-session profile state
//! - [`config`] — `.atlas.toml` loading
//! - [`error`] — Error enums

pub mod boost;
pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod session;
pub mod types;

use std::sync::Arc;
use tracing::info;

use boost::{create_booster, RelevanceBooster};
use catalog::Catalog;
use config::AtlasConfig;
use error::CatalogError;

/// Open the catalog named by `config`, or the builtin one.
pub fn load_catalog(config: &AtlasConfig) -> Result<Catalog, CatalogError> {
    match &config.catalog {
        Some(path) => {
            info!(path = %path.display(), "Using catalog file");
            Catalog::from_path(path)
        }
        None => Catalog::builtin(),
    }
}

/// Booster selected by `config`.
pub fn configured_booster(config: &AtlasConfig) -> Arc<dyn RelevanceBooster> {
    create_booster(&config.booster)
}
