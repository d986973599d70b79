use axum::{
    debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::{db, include_res, index::SearchQuery, res, session::MaybeUser, AppResult};

#[debug_handler(state = crate::AppState)]
pub async fn topics(
    State(db_pool): State<SqlitePool>,
    Query(SearchQuery { q }): Query<SearchQuery>,
    viewer: MaybeUser,
) -> AppResult<Response> {
    let topics = db::topics::search(&db_pool, &q).await?;

    let body = include_res!(str, "/pages/topics.html")
        .replace("{q}", &res::escape(&q))
        .replace("{topics}", &res::topic_list(&topics));

    Ok(res::render(&viewer.session, viewer.user.as_ref(), "Topics", &body)
        .await?
        .into_response())
}
