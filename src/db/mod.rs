pub mod messages;
pub mod rooms;
pub mod topics;
pub mod users;

use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use time::{
    format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime, UtcOffset,
};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub joined: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
}

/// A topic along with how many rooms carry it.
#[derive(Debug, Clone, FromRow)]
pub struct TopicCount {
    pub id: Uuid,
    pub name: String,
    pub room_count: i64,
}

/// A room joined with its host's and topic's display fields.
#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: Uuid,
    pub host_id: Uuid,
    pub host_username: String,
    pub topic_id: Uuid,
    pub topic_name: String,
    pub name: String,
    pub description: Option<String>,
    pub participant_count: i64,
    pub created: OffsetDateTime,
    pub updated: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub room_id: Uuid,
    pub room_name: String,
    pub user_id: Uuid,
    pub username: String,
    pub body: String,
    pub created: OffsetDateTime,
}

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("bad DATABASE_URL {database_url:?}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await
        .with_context(|| format!("couldn't open {database_url}"))?;

    migrate(&db_pool).await?;
    Ok(db_pool)
}

/// A private in-memory database. Every connection to `:memory:` is its own
/// database, so the pool is pinned to a single connection that never idles
/// out.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&db_pool).await?;
    Ok(db_pool)
}

async fn migrate(db_pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!()
        .run(db_pool)
        .await
        .context("migrations failed")?;
    tracing::debug!("schema up to date");
    Ok(())
}

/// `LIKE` pattern matching `q` anywhere, with `q`'s own wildcards taken
/// literally. Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

const STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

/// Timestamps go in as fixed-width UTC text so that `ORDER BY` on the
/// column is chronological. They still read back as `OffsetDateTime`.
pub(crate) fn stamp(at: OffsetDateTime) -> Result<String, sqlx::Error> {
    at.to_offset(UtcOffset::UTC)
        .format(STAMP_FORMAT)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}
