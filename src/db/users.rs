use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{stamp, User};

const USER_COLUMNS: &str = "id,username,email,bio,joined";

pub struct Credentials {
    pub id: Uuid,
    pub password_hash: String,
}

/// Inserts a user. `username` must already be normalised; the unique
/// constraint is the final word on whether it's taken.
pub async fn create(
    db_pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO users (id,username,password_hash,joined) VALUES (?,?,?,?)")
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(stamp(OffsetDateTime::now_utc())?)
        .execute(db_pool)
        .await?;

    get(db_pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get(db_pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn find_by_username(
    db_pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username=?"))
        .bind(username)
        .fetch_optional(db_pool)
        .await
}

pub async fn credentials(
    db_pool: &SqlitePool,
    username: &str,
) -> Result<Option<Credentials>, sqlx::Error> {
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id,password_hash FROM users WHERE username=?")
            .bind(username)
            .fetch_optional(db_pool)
            .await?;

    Ok(row.map(|(id, password_hash)| Credentials { id, password_hash }))
}

pub struct ProfileChanges<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub bio: &'a str,
}

pub async fn update_profile(
    db_pool: &SqlitePool,
    id: Uuid,
    changes: ProfileChanges<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query("UPDATE users SET username=?, email=?, bio=? WHERE id=?")
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.bio)
        .bind(id)
        .execute(db_pool)
        .await?;

    get(db_pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}
