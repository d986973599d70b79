use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{contains_pattern, stamp, Room, User};

const ROOM_SELECT: &str = "SELECT r.id, r.host_id, u.username AS host_username, \
    r.topic_id, t.name AS topic_name, r.name, r.description, \
    (SELECT COUNT(*) FROM room_participants p WHERE p.room_id=r.id) AS participant_count, \
    r.created, r.updated \
    FROM rooms r JOIN users u ON u.id=r.host_id JOIN topics t ON t.id=r.topic_id";

const NEWEST_FIRST: &str = "ORDER BY r.updated DESC, r.created DESC, r.id DESC";

pub struct RoomFields<'a> {
    pub topic_id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
}

pub async fn create(
    db_pool: &SqlitePool,
    host_id: Uuid,
    fields: RoomFields<'_>,
) -> Result<Room, sqlx::Error> {
    let id = Uuid::now_v7();
    let now = stamp(OffsetDateTime::now_utc())?;
    sqlx::query(
        "INSERT INTO rooms (id,host_id,topic_id,name,description,created,updated) VALUES (?,?,?,?,?,?,?)",
    )
    .bind(id)
    .bind(host_id)
    .bind(fields.topic_id)
    .bind(fields.name)
    .bind(fields.description)
    .bind(now.as_str())
    .bind(now.as_str())
    .execute(db_pool)
    .await?;

    get(db_pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get(db_pool: &SqlitePool, id: Uuid) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as(&format!("{ROOM_SELECT} WHERE r.id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

/// Rooms whose topic, name or description contains `q`, ignoring case.
pub async fn search(db_pool: &SqlitePool, q: &str) -> Result<Vec<Room>, sqlx::Error> {
    let pattern = contains_pattern(q);
    sqlx::query_as(&format!(
        "{ROOM_SELECT} WHERE t.name LIKE ? ESCAPE '\\' OR r.name LIKE ? ESCAPE '\\' \
         OR r.description LIKE ? ESCAPE '\\' {NEWEST_FIRST}"
    ))
    .bind(pattern.as_str())
    .bind(pattern.as_str())
    .bind(pattern.as_str())
    .fetch_all(db_pool)
    .await
}

pub async fn count(db_pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
        .fetch_one(db_pool)
        .await?;
    Ok(count)
}

pub async fn hosted_by(db_pool: &SqlitePool, host_id: Uuid) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as(&format!("{ROOM_SELECT} WHERE r.host_id=? {NEWEST_FIRST}"))
        .bind(host_id)
        .fetch_all(db_pool)
        .await
}

pub async fn update(
    db_pool: &SqlitePool,
    id: Uuid,
    fields: RoomFields<'_>,
) -> Result<Room, sqlx::Error> {
    sqlx::query("UPDATE rooms SET topic_id=?, name=?, description=?, updated=? WHERE id=?")
        .bind(fields.topic_id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(stamp(OffsetDateTime::now_utc())?)
        .bind(id)
        .execute(db_pool)
        .await?;

    get(db_pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Deletes the room; its messages and participant rows go with it.
pub async fn delete(db_pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rooms WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn participants(db_pool: &SqlitePool, room_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(
        "SELECT u.id, u.username, u.email, u.bio, u.joined FROM users u \
         JOIN room_participants p ON p.user_id=u.id WHERE p.room_id=? ORDER BY u.username",
    )
    .bind(room_id)
    .fetch_all(db_pool)
    .await
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration};

    use super::*;
    use crate::db;

    #[tokio::test]
    async fn most_recently_updated_comes_first() {
        let db_pool = db::connect_in_memory().await.unwrap();
        let alice = db::users::create(&db_pool, "alice", "x").await.unwrap();
        let topic = db::topics::get_or_create(&db_pool, "Rust").await.unwrap();
        let base = datetime!(2025-03-04 10:35:08 UTC);

        for (name, offset_ms) in [("whole second", 0), ("tenth", 100), ("later", 150)] {
            let room = create(
                &db_pool,
                alice.id,
                RoomFields {
                    topic_id: topic.id,
                    name,
                    description: None,
                },
            )
            .await
            .unwrap();
            sqlx::query("UPDATE rooms SET updated=? WHERE id=?")
                .bind(stamp(base + Duration::milliseconds(offset_ms)).unwrap())
                .bind(room.id)
                .execute(&db_pool)
                .await
                .unwrap();
        }

        let names: Vec<String> = search(&db_pool, "")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["later", "tenth", "whole second"]);
    }
}
