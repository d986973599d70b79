use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db, include_res, res,
    session::{ensure_owner, CurrentUser},
    AppError, AppResult,
};

use super::delete::{confirm_page, Confirm};

/// How much of a message body names it on the confirm page.
const PREVIEW_CHARS: usize = 50;

pub(crate) fn msg_to_html(message: &db::Message, viewer: Option<Uuid>) -> String {
    include_res!(str, "/pages/rooms/message.html")
        .replace("{id}", &message.id.to_string())
        .replace("{user_id}", &message.user_id.to_string())
        .replace("{username}", &res::escape(&message.username))
        .replace("{created}", &res::time_ago(message.created))
        .replace("{delete}", &res::delete_link(message, viewer))
        .replace("{body}", &res::markdown(&message.body))
}

async fn authored_message(
    db_pool: &SqlitePool,
    message_id: Uuid,
    acting: &CurrentUser,
) -> AppResult<db::Message> {
    let message = db::messages::get(db_pool, message_id)
        .await?
        .ok_or(AppError::NotFound("message"))?;
    ensure_owner(message.user_id, acting)?;
    Ok(message)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message_page(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Path(message_id): Path<Uuid>,
) -> AppResult<Response> {
    let message = authored_message(&db_pool, message_id, &viewer).await?;

    let preview: String = message.body.chars().take(PREVIEW_CHARS).collect();
    let confirm = Confirm {
        kind: "message",
        name: &preview,
        action: format!("/delete-message/{message_id}"),
        cancel: format!("/room/{}", message.room_id),
    };
    Ok(confirm_page(&viewer, confirm).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Path(message_id): Path<Uuid>,
) -> AppResult<Response> {
    let message = authored_message(&db_pool, message_id, &viewer).await?;

    db::messages::delete(&db_pool, message.id).await?;
    tracing::info!(author = %viewer.user.username, message = %message.id, room = %message.room_id, "message deleted");

    Ok(Redirect::to(&format!("/room/{}", message.room_id)).into_response())
}
