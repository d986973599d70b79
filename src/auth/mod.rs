mod login;
mod logout;
pub(crate) mod password;
mod register;

use axum::{routing::get, Router};

use crate::AppState;

pub use login::{login, login_page};
pub use logout::logout;
pub use register::{register, register_page};
pub(crate) use register::{normalize_username, validate_username};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_page).post(register))
}
