use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db, include_res, res,
    session::{self, Level, MaybeUser},
    AppError, AppResult,
};

use super::{normalize_username, password};

pub const NO_SUCH_USER: &str = "User does not exist";
pub const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[debug_handler(state = crate::AppState)]
pub async fn login_page(MaybeUser { user, session }: MaybeUser) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let form = include_res!(str, "/pages/auth/login.html").replace("{username}", "");
    Ok(res::render(&session, None, "Log in", &form).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub async fn login(
    State(db_pool): State<SqlitePool>,
    MaybeUser { user, session }: MaybeUser,
    Form(LoginForm { username, password }): Form<LoginForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = normalize_username(&username);
    match authenticate(&db_pool, &username, password).await {
        Ok(user_id) => {
            session::log_in(&session, user_id).await?;
            tracing::info!(%username, "logged in");
            let return_url = session::take_return_url(&session).await?;
            Ok(Redirect::to(&return_url).into_response())
        }
        Err(AppError::Auth(msg)) => {
            tracing::info!(%username, reason = %msg, "login refused");
            session::flash(&session, Level::Error, msg).await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => Err(e),
    }
}

/// Checks a username (already lowercased) and password. An unknown
/// username fails before any hashing happens.
pub(crate) async fn authenticate(
    db_pool: &SqlitePool,
    username: &str,
    password: String,
) -> AppResult<Uuid> {
    let Some(credentials) = db::users::credentials(db_pool, username).await? else {
        return Err(AppError::Auth(NO_SUCH_USER.to_owned()));
    };

    if password::verify_blocking(password, credentials.password_hash).await? {
        Ok(credentials.id)
    } else {
        Err(AppError::Auth(BAD_CREDENTIALS.to_owned()))
    }
}
