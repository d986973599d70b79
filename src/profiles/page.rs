use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db, include_res, res, session::MaybeUser, AppError, AppResult};

pub struct Profile {
    pub user: db::User,
    pub rooms: Vec<db::Room>,
    pub messages: Vec<db::Message>,
    pub topics: Vec<db::TopicCount>,
}

pub async fn view_profile(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<Profile> {
    let user = db::users::get(db_pool, user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;

    Ok(Profile {
        rooms: db::rooms::hosted_by(db_pool, user.id).await?,
        messages: db::messages::by_user(db_pool, user.id).await?,
        topics: db::topics::sidebar(db_pool).await?,
        user,
    })
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    viewer: MaybeUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Response> {
    let Profile { user, rooms, messages, topics } = view_profile(&db_pool, user_id).await?;

    let edit = if viewer.id() == Some(user.id) {
        "<a href=\"/update-profile\">Edit profile</a>"
    } else {
        ""
    };
    let room_items: String = rooms.iter().map(res::room_item).collect();
    let feed: String = messages
        .iter()
        .map(|m| res::feed_item(m, viewer.id()))
        .collect();

    let body = include_res!(str, "/pages/profiles/profile.html")
        .replace("{edit}", edit)
        .replace("{joined}", &res::time_ago(user.joined))
        .replace("{room_count}", &rooms.len().to_string())
        .replace("{topics}", &res::topic_list(&topics))
        .replace("{rooms}", &room_items)
        .replace("{feed}", &feed)
        .replace("{username}", &res::escape(&user.username))
        .replace("{bio}", &res::escape(&user.bio));

    Ok(res::render(&viewer.session, viewer.user.as_ref(), &user.username, &body)
        .await?
        .into_response())
}
