mod edit;
mod page;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/{id}", get(page::profile))
        .route("/update-profile", get(edit::edit_profile_page).post(edit::edit_profile))
}
