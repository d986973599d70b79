use axum::{
    debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{db, include_res, res, session::MaybeUser, AppResult};

/// `?q=` on the listing pages. Absent means "everything".
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// What the home page shows for a query.
pub struct Directory {
    pub rooms: Vec<db::Room>,
    pub topics: Vec<db::TopicCount>,
    pub total_rooms: i64,
    pub feed: Vec<db::Message>,
}

impl Directory {
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

pub async fn list_rooms(db_pool: &SqlitePool, q: &str) -> AppResult<Directory> {
    Ok(Directory {
        rooms: db::rooms::search(db_pool, q).await?,
        topics: db::topics::sidebar(db_pool).await?,
        total_rooms: db::rooms::count(db_pool).await?,
        feed: db::messages::feed(db_pool, q).await?,
    })
}

#[debug_handler(state = crate::AppState)]
pub async fn home(
    State(db_pool): State<SqlitePool>,
    Query(SearchQuery { q }): Query<SearchQuery>,
    viewer: MaybeUser,
) -> AppResult<Response> {
    let directory = list_rooms(&db_pool, &q).await?;

    let rooms: String = directory.rooms.iter().map(res::room_item).collect();
    let feed: String = directory
        .feed
        .iter()
        .map(|m| res::feed_item(m, viewer.id()))
        .collect();

    let body = include_res!(str, "/pages/index.html")
        .replace("{total_rooms}", &directory.total_rooms.to_string())
        .replace("{room_count}", &directory.room_count().to_string())
        .replace("{q}", &urlencoding::encode(&q))
        .replace("{topics}", &res::topic_list(&directory.topics))
        .replace("{rooms}", &rooms)
        .replace("{feed}", &feed);

    Ok(res::render_search(&viewer.session, viewer.user.as_ref(), "Home", &body, &q)
        .await?
        .into_response())
}
