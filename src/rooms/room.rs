use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db, include_res, res,
    session::{self, CurrentUser, Level, MaybeUser},
    AppError, AppResult,
};

use super::msg;

#[derive(Debug, Deserialize)]
pub(crate) struct MessageForm {
    #[serde(default)]
    body: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room(
    State(db_pool): State<SqlitePool>,
    viewer: MaybeUser,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = db::rooms::get(&db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;
    let msgs = db::messages::in_room(&db_pool, room_id).await?;
    let participants = db::rooms::participants(&db_pool, room_id).await?;

    let messages: String = msgs.iter().map(|m| msg::msg_to_html(m, viewer.id())).collect();
    let participants: String = participants
        .iter()
        .map(|p| format!("<li><a href=\"/profile/{}\">@{}</a></li>", p.id, res::escape(&p.username)))
        .collect();

    let controls = if viewer.id() == Some(room.host_id) {
        format!("<a href=\"/update-room/{room_id}\">edit</a> · <a href=\"/delete-room/{room_id}\">delete</a>")
    } else {
        String::new()
    };
    let composer = if viewer.user.is_some() {
        include_res!(str, "/pages/rooms/composer.html").replace("{room_id}", &room_id.to_string())
    } else {
        "<p class=\"muted\"><a href=\"/login\">Log in</a> to join the conversation.</p>".to_owned()
    };

    let body = include_res!(str, "/pages/rooms/room.html")
        .replace("{host_id}", &room.host_id.to_string())
        .replace("{created}", &res::time_ago(room.created))
        .replace("{participant_count}", &room.participant_count.to_string())
        .replace("{controls}", &controls)
        .replace("{composer}", &composer)
        .replace("{participants}", &participants)
        .replace("{host_username}", &res::escape(&room.host_username))
        .replace("{topic_name}", &res::escape(&room.topic_name))
        .replace("{room_name}", &res::escape(&room.name))
        .replace("{description}", &res::escape(room.description.as_deref().unwrap_or_default()))
        .replace("{messages}", &messages);

    Ok(res::render(&viewer.session, viewer.user.as_ref(), &room.name, &body)
        .await?
        .into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn post_message(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Path(room_id): Path<Uuid>,
    Form(MessageForm { body }): Form<MessageForm>,
) -> AppResult<Response> {
    if db::rooms::get(&db_pool, room_id).await?.is_none() {
        return Err(AppError::NotFound("room"));
    }

    let back = Redirect::to(&format!("/room/{room_id}")).into_response();

    let body = body.trim();
    if body.is_empty() {
        session::flash(&viewer.session, Level::Error, "Message cannot be empty").await?;
        return Ok(back);
    }

    let message = db::messages::post(&db_pool, room_id, viewer.id(), body).await?;
    tracing::info!(author = %viewer.user.username, room = %room_id, message = %message.id, "message posted");

    Ok(back)
}
