//! Hand-picked ranking scenarios over real `Project` rows, through the public API.

use chrono::{Duration, TimeZone, Utc};

use illinihunt_trending::store::{Project, ProjectStatus, ProjectStore};
use illinihunt_trending::trending::{rank_scored_at, score_item};
use illinihunt_trending::{
    period_label, rank_by_trending, rank_by_trending_at, trending_score, Period,
};

fn row(id: &str, up: Option<i64>, cm: Option<i64>, created_at: Option<String>) -> Project {
    Project {
        id: id.to_string(),
        name: id.to_string(),
        tagline: String::new(),
        category_id: None,
        upvotes_count: up,
        comments_count: cm,
        created_at,
        status: ProjectStatus::Active,
    }
}

fn ids(v: &[&Project]) -> Vec<String> {
    v.iter().map(|p| p.id.clone()).collect()
}

#[test]
fn weekly_listing_against_wall_clock() {
    let now = Utc::now();
    let items = vec![
        row("A", Some(10), Some(0), Some((now - Duration::hours(1)).to_rfc3339())),
        row("B", Some(5), Some(5), Some((now - Duration::hours(1)).to_rfc3339())),
        row("C", Some(100), Some(0), Some((now - Duration::days(30)).to_rfc3339())),
    ];
    assert_eq!(ids(&rank_by_trending(&items, Period::default())), ["B", "A"]);
}

#[test]
fn period_filter_from_seed_file_shape() {
    let now = Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap();
    let store = ProjectStore::from_seed_str(
        r#"{ "projects": [
            { "id": "fresh", "name": "x", "upvotes_count": 1, "created_at": "2025-02-09T10:00:00Z" },
            { "id": "day",   "name": "x", "upvotes_count": 1, "created_at": "2025-02-09T08:00:00Z" },
            { "id": "old",   "name": "x", "upvotes_count": 1, "created_at": "2025-02-02T08:59:59Z" },
            { "id": "jan",   "name": "x", "upvotes_count": 1, "created_at": "2025-01-10" }
        ] }"#,
    )
    .unwrap();
    let rows = store.active_projects();

    assert_eq!(ids(&rank_by_trending_at(&rows, Period::Today, now)), ["fresh"]);
    assert_eq!(ids(&rank_by_trending_at(&rows, Period::Week, now)), ["fresh", "day"]);
    // 2025-01-10 00:00 is before the 2025-01-10 09:00 month cutoff.
    assert_eq!(
        ids(&rank_by_trending_at(&rows, Period::Month, now)),
        ["fresh", "day", "old"]
    );
    assert_eq!(rank_by_trending_at(&rows, Period::All, now).len(), 4);
}

#[test]
fn month_window_on_short_month() {
    // Cutoff for 2025-03-31 is 2025-02-28 (clamped), not March 3rd.
    let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
    let rows = vec![
        row("feb28", Some(1), None, Some("2025-02-28T12:00:00Z".into())),
        row("feb27", Some(1), None, Some("2025-02-27T23:59:59Z".into())),
    ];
    assert_eq!(ids(&rank_by_trending_at(&rows, Period::Month, now)), ["feb28"]);
}

#[test]
fn nulls_are_zero_and_undated_is_fresh() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let empty = row("empty", None, None, None);
    let scored = score_item(&empty, now);
    assert_eq!(scored.score, 0.0);
    assert_eq!(scored.age_in_hours, 0.0);

    let undated = row("undated", Some(7), Some(1), None);
    assert_eq!(
        score_item(&undated, now).score,
        trending_score(7, 1, None, now)
    );
}

#[test]
fn scored_ranking_is_non_increasing() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let rows: Vec<_> = (0..25)
        .map(|i| {
            row(
                &format!("p{i}"),
                Some((i * 7) % 11),
                Some(i % 4),
                Some((now - Duration::hours(i * 5)).to_rfc3339()),
            )
        })
        .collect();
    let ranked = rank_scored_at(&rows, Period::Week, now);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    // 7 days = 168h: i * 5 <= 168 -> i in 0..=33, so all 25 stay.
    assert_eq!(ranked.len(), 25);
}

#[test]
fn labels_match_ui_copy() {
    assert_eq!(period_label(Period::Today), "Today");
    assert_eq!(period_label(Period::Week), "This Week");
    assert_eq!(period_label(Period::Month), "This Month");
    assert_eq!(period_label(Period::All), "All Time");
}
