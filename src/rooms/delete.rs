use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db, include_res, res, session::CurrentUser, AppResult};

use super::edit::hosted_room;

pub(crate) struct Confirm<'a> {
    pub kind: &'a str,
    pub name: &'a str,
    pub action: String,
    pub cancel: String,
}

/// The "are you sure?" page shared by room and message deletion.
pub(crate) async fn confirm_page(viewer: &CurrentUser, confirm: Confirm<'_>) -> AppResult<Html<String>> {
    let body = include_res!(str, "/pages/delete.html")
        .replace("{kind}", confirm.kind)
        .replace("{action}", &confirm.action)
        .replace("{cancel}", &confirm.cancel)
        .replace("{name}", &res::escape(confirm.name));

    res::render(&viewer.session, Some(&viewer.user), "Delete", &body).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_room_page(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = hosted_room(&db_pool, room_id, &viewer).await?;

    let confirm = Confirm {
        kind: "room",
        name: &room.name,
        action: format!("/delete-room/{room_id}"),
        cancel: format!("/room/{room_id}"),
    };
    Ok(confirm_page(&viewer, confirm).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_room(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = hosted_room(&db_pool, room_id, &viewer).await?;

    db::rooms::delete(&db_pool, room.id).await?;
    tracing::info!(host = %viewer.user.username, room = %room.id, name = %room.name, "room deleted");

    Ok(Redirect::to("/").into_response())
}
