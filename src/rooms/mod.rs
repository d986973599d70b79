mod delete;
mod edit;
mod form;
mod msg;
mod new;
mod room;

use axum::{routing::get, Router};

use crate::AppState;

pub use form::RoomForm;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/room/{id}", get(room::room).post(room::post_message))
        .route("/room-create", get(new::new_room_page).post(new::new_room))
        .route("/update-room/{id}", get(edit::edit_room_page).post(edit::edit_room))
        .route("/delete-room/{id}", get(delete::delete_room_page).post(delete::delete_room))
        .route("/delete-message/{id}", get(msg::delete_message_page).post(msg::delete_message))
}
