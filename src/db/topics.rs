use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{contains_pattern, stamp, Topic, TopicCount};

/// Sidebar length on the home and profile pages.
pub const SIDEBAR_TOPICS: i64 = 5;

/// Finds the topic called exactly `name`, creating it if nobody has yet.
///
/// One statement against the unique index: racing creators all get the
/// same row back. The no-op `DO UPDATE` is there so `RETURNING` yields the
/// existing row on conflict.
pub async fn get_or_create(db_pool: &SqlitePool, name: &str) -> Result<Topic, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO topics (id,name,created) VALUES (?,?,?) \
         ON CONFLICT(name) DO UPDATE SET name=excluded.name \
         RETURNING id,name",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(stamp(OffsetDateTime::now_utc())?)
    .fetch_one(db_pool)
    .await
}

pub async fn all(db_pool: &SqlitePool) -> Result<Vec<Topic>, sqlx::Error> {
    sqlx::query_as("SELECT id,name FROM topics ORDER BY created,id")
        .fetch_all(db_pool)
        .await
}

/// Topics whose name contains `q`, ignoring case, oldest first.
pub async fn search(db_pool: &SqlitePool, q: &str) -> Result<Vec<TopicCount>, sqlx::Error> {
    sqlx::query_as(
        "SELECT t.id, t.name, (SELECT COUNT(*) FROM rooms r WHERE r.topic_id=t.id) AS room_count \
         FROM topics t WHERE t.name LIKE ? ESCAPE '\\' ORDER BY t.created, t.id",
    )
    .bind(contains_pattern(q))
    .fetch_all(db_pool)
    .await
}

/// The first few topics, for the sidebar.
pub async fn sidebar(db_pool: &SqlitePool) -> Result<Vec<TopicCount>, sqlx::Error> {
    sqlx::query_as(
        "SELECT t.id, t.name, (SELECT COUNT(*) FROM rooms r WHERE r.topic_id=t.id) AS room_count \
         FROM topics t ORDER BY t.created, t.id LIMIT ?",
    )
    .bind(SIDEBAR_TOPICS)
    .fetch_all(db_pool)
    .await
}
