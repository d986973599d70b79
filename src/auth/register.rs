use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db, include_res, res,
    session::{self, MaybeUser},
    AppError, AppResult,
};

use super::password;

pub const USERNAME_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 8;
const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Deserialize)]
pub struct RegisterForm {
    username: String,
    password1: String,
    password2: String,
}

pub(crate) fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn validate_username(username: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("Username is required.".to_owned());
    }
    if username.chars().count() > USERNAME_MAX {
        errors.push(format!("Username must be at most {USERNAME_MAX} characters."));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.push("Username may contain only letters, numbers, and @/./+/-/_ characters.".to_owned());
    }
    errors
}

fn validate_password(password1: &str, password2: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password1 != password2 {
        errors.push("The two password fields didn't match.".to_owned());
    }
    if password1.chars().count() < PASSWORD_MIN {
        errors.push(format!("Password must contain at least {PASSWORD_MIN} characters."));
    }
    if !password1.is_empty() && password1.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Password can't be entirely numeric.".to_owned());
    }
    errors
}

fn register_form(username: &str, errors: &[String]) -> String {
    include_res!(str, "/pages/auth/register.html")
        .replace("{errors}", &res::error_list(errors))
        .replace("{username}", &res::escape(username))
}

#[debug_handler(state = crate::AppState)]
pub async fn register_page(MaybeUser { user, session }: MaybeUser) -> AppResult<Response> {
    Ok(res::render(&session, user.as_ref(), "Sign up", &register_form("", &[]))
        .await?
        .into_response())
}

#[debug_handler(state = crate::AppState)]
pub async fn register(
    State(db_pool): State<SqlitePool>,
    MaybeUser { user, session }: MaybeUser,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    match create_account(&db_pool, &form).await {
        Ok(new_user) => {
            session::log_in(&session, new_user.id).await?;
            tracing::info!(username = %new_user.username, "registered");
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Validation(errors)) => {
            tracing::debug!(?errors, "registration rejected");
            let page = res::render(
                &session,
                user.as_ref(),
                "Sign up",
                &register_form(&form.username, &errors),
            )
            .await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e),
    }
}

async fn create_account(db_pool: &SqlitePool, form: &RegisterForm) -> AppResult<db::User> {
    let username = normalize_username(&form.username);

    let mut errors = validate_username(&username);
    errors.extend(validate_password(&form.password1, &form.password2));
    if errors.is_empty() && db::users::find_by_username(db_pool, &username).await?.is_some() {
        errors.push(USERNAME_TAKEN.to_owned());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let password_hash = password::hash_blocking(form.password1.clone()).await?;
    match db::users::create(db_pool, &username, &password_hash).await {
        Ok(user) => Ok(user),
        Err(e) if db::is_unique_violation(&e) => Err(AppError::invalid(USERNAME_TAKEN)),
        Err(e) => Err(e.into()),
    }
}
