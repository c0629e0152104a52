// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod store;
pub mod timestamp;
pub mod trending;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::{StoreError, TrendingError};
pub use crate::trending::{
    period_cutoff, period_label, rank_by_trending, rank_by_trending_at, trending_pool_size,
    trending_score, Period, Scorable, ScoredItem,
};

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::info;

use crate::api::AppState;
use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::service::TrendingService;
use crate::store::ProjectStore;

/// Build the full in-process app: config, seeded store, service, routes and `/metrics`.
pub async fn app() -> anyhow::Result<Router> {
    let config = AppConfig::load_default()?;
    let store = ProjectStore::load_seed(&config.seed_path)
        .with_context(|| format!("loading project seed {}", config.seed_path.display()))?;

    info!(
        target: "trending",
        projects = store.len(),
        featured_count = config.featured_count,
        default_period = %config.default_period,
        "trending service ready"
    );

    let service = TrendingService::new(config, Arc::new(store), Arc::new(SystemClock));
    let metrics = Metrics::init()?;

    Ok(router(AppState::new(service)).merge(metrics.router()))
}
