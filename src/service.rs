//! # Trending Service
//! Glue between the project store and the ranking engine: period listings,
//! featured selection under the pool policy, and the cached category list.
//!
//! `now` is read from the injected clock once per call and handed to the
//! engine, so a single listing is always scored against one instant.

use std::convert::Infallible;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheStatus, TtlCache};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::metrics;
use crate::store::{Category, Project, ProjectStatus, ProjectStore};
use crate::trending::{rank_scored_at, trending_pool_size, Period, ScoredItem};

const MAX_CATEGORY_TTL_SECS: u64 = 365 * 24 * 3600;

/// A project as listed, with the score it was ranked by.
#[derive(Debug, Clone, Serialize)]
pub struct RankedProject {
    #[serde(flatten)]
    pub project: Project,
    /// `None` when the score was not finite (bad `created_at`).
    pub score: Option<f64>,
}

impl From<ScoredItem<'_, Project>> for RankedProject {
    fn from(s: ScoredItem<'_, Project>) -> Self {
        Self {
            project: s.item.clone(),
            score: s.score.is_finite().then_some(s.score),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingPage {
    pub period: Period,
    pub label: &'static str,
    pub projects: Vec<RankedProject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeaturedPage {
    pub count: usize,
    pub pool_size: usize,
    pub projects: Vec<RankedProject>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PeriodInfo {
    pub period: Period,
    pub label: &'static str,
}

pub struct TrendingService {
    config: AppConfig,
    store: Arc<ProjectStore>,
    clock: Arc<dyn Clock>,
    categories: TtlCache<Vec<Category>>,
}

impl TrendingService {
    pub fn new(config: AppConfig, store: Arc<ProjectStore>, clock: Arc<dyn Clock>) -> Self {
        // Capped at a year; chrono durations panic far below u64::MAX seconds.
        let ttl_secs = config.category_ttl_secs.min(MAX_CATEGORY_TTL_SECS);
        let ttl = Duration::seconds(ttl_secs as i64);
        let categories = TtlCache::new(ttl, clock.clone());
        Self {
            config,
            store,
            clock,
            categories,
        }
    }

    /// Active projects created within `period`, best first, at most `limit`.
    pub fn trending(&self, period: Option<Period>, limit: Option<usize>) -> TrendingPage {
        let period = period.unwrap_or(self.config.default_period);
        let limit = limit
            .unwrap_or(self.config.max_limit)
            .min(self.config.max_limit);
        let now = self.clock.now();

        let candidates = self.store.active_projects();
        let ranked = rank_scored_at(&candidates, period, now);
        let nonfinite = ranked.iter().filter(|s| !s.is_finite()).count();

        info!(
            target: "trending",
            %period,
            candidates = candidates.len(),
            in_window = ranked.len(),
            nonfinite,
            limit,
            "trending listing"
        );
        metrics::record_trending_request(period, nonfinite);

        TrendingPage {
            period,
            label: period.label(),
            projects: ranked.into_iter().take(limit).map(RankedProject::from).collect(),
        }
    }

    /// Featured slice: rank an oversized pool of the newest projects over all
    /// time, then cut down to `count`.
    pub fn featured(&self, count: Option<usize>) -> FeaturedPage {
        let count = count
            .unwrap_or(self.config.featured_count)
            .min(self.config.max_limit);
        let pool_size = trending_pool_size(count);
        let now = self.clock.now();

        let pool = self.store.recent_pool(pool_size);
        let ranked = rank_scored_at(&pool, Period::All, now);

        info!(
            target: "trending",
            count,
            pool_size,
            pool = pool.len(),
            "featured selection"
        );
        metrics::record_featured_pool(pool_size);

        FeaturedPage {
            count,
            pool_size,
            projects: ranked.into_iter().take(count).map(RankedProject::from).collect(),
        }
    }

    pub fn periods(&self) -> Vec<PeriodInfo> {
        Period::ALL
            .iter()
            .map(|&period| PeriodInfo {
                period,
                label: period.label(),
            })
            .collect()
    }

    pub fn categories(&self) -> (Vec<Category>, CacheStatus) {
        let (cats, status) = self
            .categories
            .get_or_refresh(|| Ok::<_, Infallible>(self.store.categories()))
            .unwrap_or_else(|never| match never {});
        debug!(target: "trending", cache = status.as_str(), n = cats.len(), "categories");
        metrics::record_category_cache(status);
        (cats, status)
    }

    pub fn invalidate_categories(&self) {
        self.categories.invalidate();
        info!(target: "trending", "category cache invalidated");
    }

    pub fn upvote(&self, id: &str) -> Result<Project, StoreError> {
        self.store.record_upvote(id)
    }

    pub fn retract_upvote(&self, id: &str) -> Result<Project, StoreError> {
        self.store.retract_upvote(id)
    }

    pub fn comment(&self, id: &str) -> Result<Project, StoreError> {
        self.store.record_comment(id)
    }

    pub fn moderate(&self, id: &str, status: ProjectStatus) -> Result<Project, StoreError> {
        self.store.set_status(id, status)
    }
}
