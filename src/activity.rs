use axum::{
    debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::{db, include_res, index::SearchQuery, res, session::MaybeUser, AppResult};

/// Every message on the site, newest first, narrowed to rooms whose topic
/// matches `q` when one is given.
#[debug_handler(state = crate::AppState)]
pub async fn activity(
    State(db_pool): State<SqlitePool>,
    Query(SearchQuery { q }): Query<SearchQuery>,
    viewer: MaybeUser,
) -> AppResult<Response> {
    let messages = db::messages::feed(&db_pool, &q).await?;

    let feed: String = messages
        .iter()
        .map(|m| res::feed_item(m, viewer.id()))
        .collect();
    let body = include_res!(str, "/pages/activity.html")
        .replace("{q}", &res::escape(&q))
        .replace("{feed}", &feed);

    Ok(res::render(&viewer.session, viewer.user.as_ref(), "Activity", &body)
        .await?
        .into_response())
}
