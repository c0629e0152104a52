//! # Trending Engine
//! Pure, testable ranking logic: decayed engagement score, period cutoffs,
//! stable descending sort. No I/O and no state between calls.
//!
//! Score = (upvotes + comments * COMMENT_WEIGHT) / (age_hours + GRAVITY_OFFSET) ^ GRAVITY
//!
//! Every ranking pass captures `now` once and threads it through, so all items
//! in one call are scored against the same instant. The `_at` variants take
//! `now` explicitly for deterministic callers and tests.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrendingError;
use crate::timestamp::parse_created_at;

/// A comment counts twice as much as an upvote.
pub const COMMENT_WEIGHT: f64 = 2.0;
/// Decay exponent; higher means older items fall off faster.
pub const GRAVITY: f64 = 1.8;
/// Added to the age so brand-new items never divide by ~0.
pub const GRAVITY_OFFSET: f64 = 2.0;

/// Rank `max(n * TRENDING_POOL_MULTIPLIER, MIN_TRENDING_POOL_SIZE)` candidates
/// before cutting down to `n` featured items.
pub const TRENDING_POOL_MULTIPLIER: usize = 5;
pub const MIN_TRENDING_POOL_SIZE: usize = 50;
/// Default size of the featured slice.
pub const FEATURED_PROJECTS_COUNT: usize = 30;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Minimal capability a record needs to be ranked.
///
/// Counts and timestamp are nullable the same way the project table is;
/// null counts are read as zero and a null timestamp as "created now".
pub trait Scorable {
    fn upvotes_count(&self) -> Option<i64>;
    fn comments_count(&self) -> Option<i64>;
    fn created_at(&self) -> Option<&str>;
}

impl<T: Scorable + ?Sized> Scorable for &T {
    fn upvotes_count(&self) -> Option<i64> {
        (**self).upvotes_count()
    }
    fn comments_count(&self) -> Option<i64> {
        (**self).comments_count()
    }
    fn created_at(&self) -> Option<&str> {
        (**self).created_at()
    }
}

/// Trailing time window used to filter listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    #[default]
    Week,
    Month,
    All,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::All];

    /// Wire/query-string key (`today`, `week`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        period_label(self)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = TrendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "all" => Ok(Period::All),
            _ => Err(TrendingError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Display label for a period.
pub fn period_label(period: Period) -> &'static str {
    match period {
        Period::Today => "Today",
        Period::Week => "This Week",
        Period::Month => "This Month",
        Period::All => "All Time",
    }
}

/// Earliest creation instant eligible for `period`; `None` means no filtering.
///
/// `Month` uses calendar subtraction and clamps to the last valid day
/// (March 31 -> February 28/29), keeping the time of day.
pub fn period_cutoff(period: Period, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match period {
        Period::Today => Some(now - Duration::hours(24)),
        Period::Week => Some(now - Duration::days(7)),
        Period::Month => Some(
            now.checked_sub_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        ),
        Period::All => None,
    }
}

/// Hours elapsed from `created` to `now`, clamped at zero for future timestamps.
pub fn age_in_hours(created: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = (now - created).num_milliseconds().max(0);
    elapsed_ms as f64 / MS_PER_HOUR
}

/// Weighted engagement signal (numerator of the score).
pub fn engagement_signal(upvotes: i64, comments: i64) -> f64 {
    upvotes as f64 + comments as f64 * COMMENT_WEIGHT
}

fn decayed(signal: f64, age_hours: f64) -> f64 {
    signal / (age_hours + GRAVITY_OFFSET).powf(GRAVITY)
}

/// Trending score of a single item at `now`.
///
/// A missing `created_at` counts as zero age. An unparseable one yields `NaN`;
/// use [`try_trending_score`] to get an error instead.
pub fn trending_score(
    upvotes: i64,
    comments: i64,
    created_at: Option<&str>,
    now: DateTime<Utc>,
) -> f64 {
    try_trending_score(upvotes, comments, created_at, now).unwrap_or(f64::NAN)
}

/// Same as [`trending_score`] against the current wall clock.
pub fn trending_score_now(upvotes: i64, comments: i64, created_at: Option<&str>) -> f64 {
    trending_score(upvotes, comments, created_at, Utc::now())
}

/// Strict variant: rejects malformed timestamps instead of producing `NaN`.
pub fn try_trending_score(
    upvotes: i64,
    comments: i64,
    created_at: Option<&str>,
    now: DateTime<Utc>,
) -> Result<f64, TrendingError> {
    let created = match created_at {
        Some(raw) => parse_created_at(raw)?,
        None => now,
    };
    let age = age_in_hours(created, now);
    Ok(decayed(engagement_signal(upvotes, comments), age))
}

/// An item paired with its score for one ranking pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoredItem<'a, T> {
    pub item: &'a T,
    pub score: f64,
    /// `NaN` when the item's timestamp could not be parsed.
    pub age_in_hours: f64,
}

impl<T> ScoredItem<'_, T> {
    pub fn is_finite(&self) -> bool {
        self.score.is_finite()
    }
}

/// Score one item against `now`, reading null counts as zero.
pub fn score_item<T: Scorable>(item: &T, now: DateTime<Utc>) -> ScoredItem<'_, T> {
    let upvotes = item.upvotes_count().unwrap_or(0);
    let comments = item.comments_count().unwrap_or(0);

    let age = match item.created_at() {
        None => 0.0,
        Some(raw) => match parse_created_at(raw) {
            Ok(created) => age_in_hours(created, now),
            Err(_) => f64::NAN,
        },
    };

    ScoredItem {
        item,
        score: decayed(engagement_signal(upvotes, comments), age),
        age_in_hours: age,
    }
}

/// True when `item` was created at or after `cutoff`. Missing or unparseable
/// timestamps never satisfy a cutoff.
fn within_window<T: Scorable>(item: &T, cutoff: Option<DateTime<Utc>>) -> bool {
    let Some(cutoff) = cutoff else {
        return true;
    };
    item.created_at()
        .and_then(|raw| parse_created_at(raw).ok())
        .is_some_and(|created| created >= cutoff)
}

/// Descending by score; non-finite scores sink below every finite one.
fn by_score_desc(a: f64, b: f64) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

/// Filter by period and sort by descending score, keeping the scores.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_scored_at<'a, T, I>(
    items: I,
    period: Period,
    now: DateTime<Utc>,
) -> Vec<ScoredItem<'a, T>>
where
    T: Scorable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let cutoff = period_cutoff(period, now);

    let mut scored: Vec<ScoredItem<'a, T>> = items
        .into_iter()
        .filter(|it| within_window(*it, cutoff))
        .map(|it| score_item(it, now))
        .collect();

    scored.sort_by(|a, b| by_score_desc(a.score, b.score));
    scored
}

/// Rank items for `period` against an explicit `now`.
///
/// Output is a reordering of the period-filtered input; nothing is truncated.
pub fn rank_by_trending_at<'a, T, I>(items: I, period: Period, now: DateTime<Utc>) -> Vec<&'a T>
where
    T: Scorable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    rank_scored_at(items, period, now)
        .into_iter()
        .map(|s| s.item)
        .collect()
}

/// Rank items for `period`, capturing the wall clock once for the whole pass.
pub fn rank_by_trending<'a, T, I>(items: I, period: Period) -> Vec<&'a T>
where
    T: Scorable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    rank_by_trending_at(items, period, Utc::now())
}

/// Candidate pool to rank before truncating to `featured` items.
pub fn trending_pool_size(featured: usize) -> usize {
    featured
        .saturating_mul(TRENDING_POOL_MULTIPLIER)
        .max(MIN_TRENDING_POOL_SIZE)
}
