use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db,
    session::{ensure_owner, CurrentUser},
    AppError, AppResult,
};

use super::form::{self, FormPage, RoomForm};

/// Loads a room the acting user hosts.
pub(crate) async fn hosted_room(
    db_pool: &SqlitePool,
    room_id: Uuid,
    acting: &CurrentUser,
) -> AppResult<db::Room> {
    let room = db::rooms::get(db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;
    ensure_owner(room.host_id, acting)?;
    Ok(room)
}

fn page(action: &str) -> FormPage<'_> {
    FormPage {
        heading: "Update room",
        action,
        submit: "Update",
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_room_page(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = hosted_room(&db_pool, room_id, &viewer).await?;

    let action = format!("/update-room/{room_id}");
    Ok(form::render(&db_pool, &viewer, page(&action), &RoomForm::from_room(&room), &[])
        .await?
        .into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_room(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Path(room_id): Path<Uuid>,
    Form(room_form): Form<RoomForm>,
) -> AppResult<Response> {
    hosted_room(&db_pool, room_id, &viewer).await?;

    let updated = match room_form.resolve(&db_pool).await {
        Ok(fields) => db::rooms::update(&db_pool, room_id, fields).await?,
        Err(AppError::Validation(errors)) => {
            let action = format!("/update-room/{room_id}");
            let page = form::render(&db_pool, &viewer, page(&action), &room_form, &errors).await?;
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
        Err(e) => return Err(e),
    };

    tracing::info!(room = %updated.id, topic = %updated.topic_name, "room updated");
    Ok(Redirect::to("/").into_response())
}
