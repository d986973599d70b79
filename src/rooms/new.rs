use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;

use crate::{db, session::CurrentUser, AppError, AppResult};

use super::form::{self, FormPage, RoomForm};

const PAGE: FormPage<'static> = FormPage {
    heading: "Create room",
    action: "/room-create",
    submit: "Create",
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room_page(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
) -> AppResult<Response> {
    Ok(form::render(&db_pool, &viewer, PAGE, &RoomForm::default(), &[])
        .await?
        .into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Form(room_form): Form<RoomForm>,
) -> AppResult<Response> {
    match create_room(&db_pool, &viewer, &room_form).await {
        Ok(room) => {
            tracing::info!(host = %viewer.user.username, room = %room.id, topic = %room.topic_name, "room created");
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Validation(errors)) => {
            let page = form::render(&db_pool, &viewer, PAGE, &room_form, &errors).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e),
    }
}

pub(crate) async fn create_room(
    db_pool: &SqlitePool,
    host: &CurrentUser,
    room_form: &RoomForm,
) -> AppResult<db::Room> {
    let fields = room_form.resolve(db_pool).await?;
    Ok(db::rooms::create(db_pool, host.id(), fields).await?)
}
