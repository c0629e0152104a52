// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::trending::{Period, FEATURED_PROJECTS_COUNT};

pub const DEFAULT_CONFIG_PATH: &str = "config/trending.toml";
pub const ENV_CONFIG_PATH: &str = "TRENDING_CONFIG_PATH";

pub const ENV_FEATURED_COUNT: &str = "TRENDING_FEATURED_COUNT";
pub const ENV_DEFAULT_PERIOD: &str = "TRENDING_DEFAULT_PERIOD";
pub const ENV_SEED_PATH: &str = "TRENDING_SEED_PATH";
pub const ENV_CATEGORY_TTL_SECS: &str = "TRENDING_CATEGORY_TTL_SECS";
pub const ENV_MAX_LIMIT: &str = "TRENDING_MAX_LIMIT";

fn default_featured_count() -> usize {
    FEATURED_PROJECTS_COUNT
}
fn default_max_limit() -> usize {
    100
}
fn default_seed_path() -> PathBuf {
    PathBuf::from("config/projects.json")
}
fn default_category_ttl_secs() -> u64 {
    300
}

/// Service settings. Ranking constants are compile-time and not listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Size of the featured slice when the caller does not ask for one.
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
    /// Period used by `/trending` without `?period=`.
    #[serde(default)]
    pub default_period: Period,
    /// Upper bound for `limit` / `count` query parameters.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_seed_path")]
    pub seed_path: PathBuf,
    #[serde(default = "default_category_ttl_secs")]
    pub category_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            featured_count: default_featured_count(),
            default_period: Period::default(),
            max_limit: default_max_limit(),
            seed_path: default_seed_path(),
            category_ttl_secs: default_category_ttl_secs(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s).context("parsing trending config TOML")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading trending config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Resolve config with env var + fallbacks, then apply env overrides:
    /// 1) $TRENDING_CONFIG_PATH (must exist)
    /// 2) config/trending.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    /// Apply `TRENDING_*` env overrides. Unparseable values are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_parse::<usize>(ENV_FEATURED_COUNT) {
            self.featured_count = n;
        }
        if let Some(p) = env_parse::<Period>(ENV_DEFAULT_PERIOD) {
            self.default_period = p;
        }
        if let Some(n) = env_parse::<usize>(ENV_MAX_LIMIT) {
            self.max_limit = n;
        }
        if let Some(n) = env_parse::<u64>(ENV_CATEGORY_TTL_SECS) {
            self.category_ttl_secs = n;
        }
        if let Ok(p) = env::var(ENV_SEED_PATH) {
            if !p.trim().is_empty() {
                self.seed_path = PathBuf::from(p.trim());
            }
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        self.max_limit = self.max_limit.max(1);
        self.featured_count = self.featured_count.clamp(1, self.max_limit);
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(target: "config", key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}
