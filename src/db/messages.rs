use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{contains_pattern, stamp, Message};

const MESSAGE_SELECT: &str = "SELECT m.id, m.room_id, r.name AS room_name, m.user_id, \
    u.username, m.body, m.created \
    FROM messages m JOIN rooms r ON r.id=m.room_id JOIN users u ON u.id=m.user_id";

/// Stores a message and makes its author a participant of the room, both or
/// neither. Participation is a set: posting again changes nothing.
pub async fn post(
    db_pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
    body: &str,
) -> Result<Message, sqlx::Error> {
    post_at(db_pool, room_id, user_id, body, OffsetDateTime::now_utc()).await
}

async fn post_at(
    db_pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
    body: &str,
    created: OffsetDateTime,
) -> Result<Message, sqlx::Error> {
    let id = Uuid::now_v7();
    let mut tx = db_pool.begin().await?;

    sqlx::query("INSERT INTO messages (id,room_id,user_id,body,created) VALUES (?,?,?,?,?)")
        .bind(id)
        .bind(room_id)
        .bind(user_id)
        .bind(body)
        .bind(stamp(created)?)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT OR IGNORE INTO room_participants (room_id,user_id) VALUES (?,?)")
        .bind(room_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get(db_pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get(db_pool: &SqlitePool, id: Uuid) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as(&format!("{MESSAGE_SELECT} WHERE m.id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn delete(db_pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// A room's thread, oldest first.
pub async fn in_room(db_pool: &SqlitePool, room_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as(&format!("{MESSAGE_SELECT} WHERE m.room_id=? ORDER BY m.created, m.id"))
        .bind(room_id)
        .fetch_all(db_pool)
        .await
}

pub async fn by_user(db_pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{MESSAGE_SELECT} WHERE m.user_id=? ORDER BY m.created DESC, m.id DESC"
    ))
    .bind(user_id)
    .fetch_all(db_pool)
    .await
}

/// Messages from every room whose topic contains `q`, newest first.
pub async fn feed(db_pool: &SqlitePool, q: &str) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{MESSAGE_SELECT} JOIN topics t ON t.id=r.topic_id \
         WHERE t.name LIKE ? ESCAPE '\\' ORDER BY m.created DESC, m.id DESC"
    ))
    .bind(contains_pattern(q))
    .fetch_all(db_pool)
    .await
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration};

    use super::*;
    use crate::db::{self, rooms::RoomFields};

    async fn room_with_author(db_pool: &SqlitePool) -> (Uuid, Uuid) {
        let alice = db::users::create(db_pool, "alice", "x").await.unwrap();
        let topic = db::topics::get_or_create(db_pool, "Rust").await.unwrap();
        let room = db::rooms::create(
            db_pool,
            alice.id,
            RoomFields {
                topic_id: topic.id,
                name: "Ownership",
                description: None,
            },
        )
        .await
        .unwrap();
        (room.id, alice.id)
    }

    fn bodies(messages: Vec<Message>) -> Vec<String> {
        messages.into_iter().map(|m| m.body).collect()
    }

    #[tokio::test]
    async fn sub_second_times_sort_chronologically() {
        let db_pool = db::connect_in_memory().await.unwrap();
        let (room_id, user_id) = room_with_author(&db_pool).await;
        let base = datetime!(2025-03-04 10:35:08 UTC);

        // Inserted out of time order so the ids can't carry the sort.
        for (body, at) in [
            ("third", base + Duration::milliseconds(150)),
            ("second", base + Duration::milliseconds(100)),
            ("first", base),
            ("fourth", base + Duration::milliseconds(900)),
        ] {
            post_at(&db_pool, room_id, user_id, body, at).await.unwrap();
        }

        let thread = bodies(in_room(&db_pool, room_id).await.unwrap());
        assert_eq!(thread, ["first", "second", "third", "fourth"]);

        let feed = bodies(feed(&db_pool, "").await.unwrap());
        assert_eq!(feed, ["fourth", "third", "second", "first"]);

        let said = bodies(by_user(&db_pool, user_id).await.unwrap());
        assert_eq!(said, feed);
    }

    #[tokio::test]
    async fn created_reads_back_as_stored() {
        let db_pool = db::connect_in_memory().await.unwrap();
        let (room_id, user_id) = room_with_author(&db_pool).await;
        let at = datetime!(2025-03-04 10:35:08 UTC) + Duration::milliseconds(150);

        let message = post_at(&db_pool, room_id, user_id, "hi", at).await.unwrap();
        assert_eq!(message.created, at);
    }
}
