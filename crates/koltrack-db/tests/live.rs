//! Live integration tests for koltrack-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/koltrack-db/`), so `"../../migrations"` resolves to the
//! workspace migration directory.

use chrono::{DateTime, TimeZone, Utc};
use koltrack_core::{Observation, ObservationLog, TokenSettings};
use koltrack_db::{
    create_kol, create_post, delete_kol, delete_post, get_kol, get_post, get_token_settings,
    list_kols, list_posts, list_posts_with_kol, update_kol, update_post, update_token_settings,
};

fn observation(rfc3339: &str, likes: u64, views: u64) -> Observation {
    Observation {
        date: DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp"),
        likes,
        views,
    }
}

async fn insert_test_kol(pool: &sqlx::PgPool, name: &str) -> i64 {
    create_kol(pool, name, "https://api.dicebear.com/6.x/avataaars/svg?seed=test")
        .await
        .unwrap_or_else(|e| panic!("insert_test_kol failed for '{name}': {e}"))
        .id
}

#[sqlx::test(migrations = "../../migrations")]
async fn kol_crud_round_trip(pool: sqlx::PgPool) {
    let id = insert_test_kol(&pool, "John Doe").await;

    let fetched = get_kol(&pool, id).await.expect("get").expect("row exists");
    assert_eq!(fetched.name, "John Doe");

    let updated = update_kol(&pool, id, "Johnny", "https://example.com/a.svg")
        .await
        .expect("update")
        .expect("row exists");
    assert_eq!(updated.name, "Johnny");
    assert_eq!(updated.avatar, "https://example.com/a.svg");

    assert!(delete_kol(&pool, id).await.expect("delete"));
    assert!(get_kol(&pool, id).await.expect("get").is_none());
    assert!(list_kols(&pool).await.expect("list").is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_kol_returns_none_for_unknown_id(pool: sqlx::PgPool) {
    let result = update_kol(&pool, 999, "Nobody", "").await.expect("update");
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn post_counts_round_trip_through_jsonb(pool: sqlx::PgPool) {
    let kol_id = insert_test_kol(&pool, "Jane Smith").await;

    let mut log = ObservationLog::new();
    log.append(observation("2024-08-02T10:00:00+08:00", 1000, 5000));
    log.append(observation("2024-08-26T21:15:00+08:00", 1500, 7500));

    let created = create_post(
        &pool,
        "https://www.instagram.com/p/AbCdEf",
        kol_id,
        Some(Utc.with_ymd_and_hms(2024, 7, 26, 0, 0, 0).unwrap()),
        &log,
    )
    .await
    .expect("create");

    let fetched = get_post(&pool, created.id)
        .await
        .expect("get")
        .expect("row exists");
    assert_eq!(fetched.counts.0, log);
    assert_eq!(fetched.url, "https://www.instagram.com/p/AbCdEf");
}

#[sqlx::test(migrations = "../../migrations")]
async fn legacy_bare_array_counts_are_readable(pool: sqlx::PgPool) {
    let kol_id = insert_test_kol(&pool, "Legacy").await;

    // Rows written before the versioned wrapper hold a bare JSON array.
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO posts (url, kol_id, counts) VALUES ($1, $2, $3::jsonb) RETURNING id",
    )
    .bind("https://www.instagram.com/p/legacy")
    .bind(kol_id)
    .bind(r#"[{"date": "2023-08-02T00:00:00+08:00", "likes": 1000, "views": 5000}]"#)
    .fetch_one(&pool)
    .await
    .expect("raw insert");

    let fetched = get_post(&pool, id).await.expect("get").expect("row exists");
    assert_eq!(fetched.counts.len(), 1);
    assert_eq!(fetched.counts.latest().likes, 1000);
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_post_overwrites_the_whole_log(pool: sqlx::PgPool) {
    let kol_id = insert_test_kol(&pool, "Writer").await;

    let mut log = ObservationLog::new();
    log.append(observation("2024-08-02T10:00:00+08:00", 10, 100));
    let created = create_post(&pool, "https://example.com/p/1", kol_id, None, &log)
        .await
        .expect("create");

    // A rebuilt two-element log replaces the stored one wholesale.
    let mut rebuilt = ObservationLog::new();
    rebuilt.append(observation("2024-08-03T10:00:00+08:00", 20, 200));
    rebuilt.append(observation("2024-08-04T10:00:00+08:00", 30, 300));

    let updated = update_post(&pool, created.id, &rebuilt, None)
        .await
        .expect("update")
        .expect("row exists");
    assert_eq!(updated.counts.0, rebuilt);
    assert!(updated.creation_date.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_post_coalesces_creation_date(pool: sqlx::PgPool) {
    let kol_id = insert_test_kol(&pool, "Dates").await;
    let original = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();

    let created = create_post(
        &pool,
        "https://example.com/p/2",
        kol_id,
        Some(original),
        &ObservationLog::new(),
    )
    .await
    .expect("create");

    // NULL keeps the stored value.
    let kept = update_post(&pool, created.id, &ObservationLog::new(), None)
        .await
        .expect("update")
        .expect("row exists");
    assert_eq!(kept.creation_date, Some(original));

    // A supplied timestamp overwrites it.
    let newer = Utc.with_ymd_and_hms(2024, 8, 1, 9, 30, 0).unwrap();
    let overwritten = update_post(&pool, created.id, &ObservationLog::new(), Some(newer))
        .await
        .expect("update")
        .expect("row exists");
    assert_eq!(overwritten.creation_date, Some(newer));
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_post_returns_none_for_unknown_id(pool: sqlx::PgPool) {
    let result = update_post(&pool, 12345, &ObservationLog::new(), None)
        .await
        .expect("update");
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_post_removes_exactly_that_post(pool: sqlx::PgPool) {
    let kol_id = insert_test_kol(&pool, "Deleter").await;
    let keep = create_post(&pool, "https://example.com/p/keep", kol_id, None, &ObservationLog::new())
        .await
        .expect("create");
    let gone = create_post(&pool, "https://example.com/p/gone", kol_id, None, &ObservationLog::new())
        .await
        .expect("create");

    assert!(delete_post(&pool, gone.id).await.expect("delete"));
    assert!(!delete_post(&pool, gone.id).await.expect("second delete"));

    let remaining = list_posts(&pool).await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_a_kol_leaves_its_posts_dangling(pool: sqlx::PgPool) {
    let kol_id = insert_test_kol(&pool, "Dangling").await;
    let post = create_post(&pool, "https://example.com/p/3", kol_id, None, &ObservationLog::new())
        .await
        .expect("create");

    assert!(delete_kol(&pool, kol_id).await.expect("delete kol"));

    // The post survives with its kol_id intact; the join renders the
    // placeholder name.
    let posts = list_posts_with_kol(&pool).await.expect("list");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, post.id);
    assert_eq!(posts[0].kol_id, kol_id);
    assert_eq!(posts[0].kol_name, "Unknown KOL");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_posts_with_kol_joins_the_owner_name(pool: sqlx::PgPool) {
    let kol_id = insert_test_kol(&pool, "Bob Johnson").await;
    create_post(&pool, "https://example.com/p/4", kol_id, None, &ObservationLog::new())
        .await
        .expect("create");

    let posts = list_posts_with_kol(&pool).await.expect("list");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].kol_name, "Bob Johnson");
}

#[sqlx::test(migrations = "../../migrations")]
async fn token_settings_default_row_is_seeded(pool: sqlx::PgPool) {
    let settings = get_token_settings(&pool).await.expect("get");
    assert_eq!(settings, TokenSettings::default());
}

#[sqlx::test(migrations = "../../migrations")]
async fn token_settings_update_round_trips(pool: sqlx::PgPool) {
    let updated = update_token_settings(
        &pool,
        TokenSettings {
            likes_per_token: 10,
            views_per_token: 500,
        },
    )
    .await
    .expect("update");
    assert_eq!(updated.likes_per_token, 10);
    assert_eq!(updated.views_per_token, 500);

    let fetched = get_token_settings(&pool).await.expect("get");
    assert_eq!(fetched, updated);
}
