//! # Project Store
//! In-memory project table seeded from JSON, standing in for the hosted
//! database the web client talks to.
//!
//! Seed shape:
//! ```json
//! {
//!   "categories": [{ "id": "ai", "name": "AI & ML" }],
//!   "projects": [{
//!     "id": "p1", "name": "...", "tagline": "...", "category_id": "ai",
//!     "upvotes_count": 3, "comments_count": null,
//!     "created_at": "2024-05-01T12:00:00Z", "status": "active"
//!   }]
//! }
//! ```

use std::cmp::Reverse;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::timestamp::parse_created_at;
use crate::trending::Scorable;

/// Moderation state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Hidden,
    Archived,
}

impl FromStr for ProjectStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "hidden" => Ok(ProjectStatus::Hidden),
            "archived" => Ok(ProjectStatus::Archived),
            other => Err(StoreError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub upvotes_count: Option<i64>,
    #[serde(default)]
    pub comments_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Scorable for Project {
    fn upvotes_count(&self) -> Option<i64> {
        self.upvotes_count
    }
    fn comments_count(&self) -> Option<i64> {
        self.comments_count
    }
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

impl Project {
    fn created_instant(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|raw| parse_created_at(raw).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: Vec<Category>,
    projects: Vec<Project>,
}

/// Thread-safe project/category tables.
#[derive(Debug, Default)]
pub struct ProjectStore {
    inner: RwLock<Tables>,
}

impl ProjectStore {
    pub fn new(categories: Vec<Category>, projects: Vec<Project>) -> Self {
        Self {
            inner: RwLock::new(Tables {
                categories,
                projects,
            }),
        }
    }

    pub fn from_seed_str(json: &str) -> Result<Self, StoreError> {
        let seed: Seed = serde_json::from_str(json)?;
        Ok(Self::new(seed.categories, seed.projects))
    }

    /// Load the seed file at `path`.
    pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let store = Self::from_seed_str(&content)?;
        info!(
            target: "store",
            path = %path.display(),
            projects = store.len(),
            "project seed loaded"
        );
        Ok(store)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        match self.inner.write() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    pub fn len(&self) -> usize {
        self.read().projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        self.read().projects.iter().find(|p| p.id == id).cloned()
    }

    /// Snapshot of every listable project, in table order.
    pub fn active_projects(&self) -> Vec<Project> {
        self.read()
            .projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .cloned()
            .collect()
    }

    /// The `n` newest active projects. Undated or unparseable rows go last.
    pub fn recent_pool(&self, n: usize) -> Vec<Project> {
        let mut active = self.active_projects();
        active.sort_by_key(|p| Reverse(p.created_instant()));
        active.truncate(n);
        active
    }

    pub fn categories(&self) -> Vec<Category> {
        self.read().categories.clone()
    }

    fn update<F>(&self, id: &str, f: F) -> Result<Project, StoreError>
    where
        F: FnOnce(&mut Project),
    {
        let mut tables = self.write();
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(project);
        Ok(project.clone())
    }

    pub fn record_upvote(&self, id: &str) -> Result<Project, StoreError> {
        let p = self.update(id, |p| {
            p.upvotes_count = Some(p.upvotes_count.unwrap_or(0).saturating_add(1));
        })?;
        debug!(target: "store", id, upvotes = ?p.upvotes_count, "upvote recorded");
        Ok(p)
    }

    /// Retract an upvote; never goes below zero.
    pub fn retract_upvote(&self, id: &str) -> Result<Project, StoreError> {
        let p = self.update(id, |p| {
            p.upvotes_count = Some(p.upvotes_count.unwrap_or(0).saturating_sub(1).max(0));
        })?;
        debug!(target: "store", id, upvotes = ?p.upvotes_count, "upvote retracted");
        Ok(p)
    }

    pub fn record_comment(&self, id: &str) -> Result<Project, StoreError> {
        let p = self.update(id, |p| {
            p.comments_count = Some(p.comments_count.unwrap_or(0).saturating_add(1));
        })?;
        debug!(target: "store", id, comments = ?p.comments_count, "comment recorded");
        Ok(p)
    }

    /// Admin moderation: hide, archive or restore a project.
    pub fn set_status(&self, id: &str, status: ProjectStatus) -> Result<Project, StoreError> {
        let p = self.update(id, |p| p.status = status)?;
        info!(target: "store", id, status = ?status, "project status changed");
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"{
        "categories": [{ "id": "ai", "name": "AI & ML" }],
        "projects": [
            { "id": "old", "name": "Old", "upvotes_count": 4,
              "created_at": "2024-01-01T00:00:00Z" },
            { "id": "new",  "name": "New",  "created_at": "2024-05-01T00:00:00Z" },
            { "id": "none", "name": "Undated" },
            { "id": "hid", "name": "Hidden", "created_at": "2024-06-01T00:00:00Z",
              "status": "hidden" }
        ]
    }"#;

    fn store() -> ProjectStore {
        ProjectStore::from_seed_str(SEED).unwrap()
    }

    #[test]
    fn seed_defaults_are_applied() {
        let s = store();
        assert_eq!(s.len(), 4);
        let p = s.get("new").unwrap();
        assert_eq!(p.upvotes_count, None);
        assert_eq!(p.status, ProjectStatus::Active);
        assert_eq!(s.categories().len(), 1);
    }

    #[test]
    fn hidden_projects_are_not_listed() {
        let ids: Vec<_> = store().active_projects().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["old", "new", "none"]);
    }

    #[test]
    fn recent_pool_is_newest_first_and_truncated() {
        let ids: Vec<_> = store().recent_pool(2).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["new", "old"]);
    }

    #[test]
    fn upvote_and_retract_saturate_at_zero() {
        let s = store();
        assert_eq!(s.record_upvote("new").unwrap().upvotes_count, Some(1));
        assert_eq!(s.retract_upvote("new").unwrap().upvotes_count, Some(0));
        assert_eq!(s.retract_upvote("new").unwrap().upvotes_count, Some(0));
        assert_eq!(s.record_comment("new").unwrap().comments_count, Some(1));
    }

    #[test]
    fn retract_from_negative_seed_counts_clamps_to_zero() {
        let s = ProjectStore::from_seed_str(
            r#"{ "projects": [
                { "id": "min", "name": "Min", "upvotes_count": -9223372036854775808 },
                { "id": "neg", "name": "Neg", "upvotes_count": -5 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(s.retract_upvote("min").unwrap().upvotes_count, Some(0));
        assert_eq!(s.retract_upvote("neg").unwrap().upvotes_count, Some(0));
    }

    #[test]
    fn empty_seed_is_an_empty_store() {
        let s = ProjectStore::from_seed_str("{}").unwrap();
        assert!(s.is_empty());
        assert!(s.recent_pool(10).is_empty());
        assert!(!store().is_empty());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let err = store().record_upvote("nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn moderation_round_trip() {
        let s = store();
        s.set_status("old", ProjectStatus::Archived).unwrap();
        assert!(s.active_projects().iter().all(|p| p.id != "old"));
        s.set_status("hid", "Active".parse().unwrap()).unwrap();
        assert!(s.active_projects().iter().any(|p| p.id == "hid"));
        assert!("deleted".parse::<ProjectStatus>().is_err());
    }
}
