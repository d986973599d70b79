use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    auth::{normalize_username, validate_username},
    db::{self, users::ProfileChanges},
    include_res, res,
    session::CurrentUser,
    AppError, AppResult,
};

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
}

fn validate_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return None;
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => None,
        _ => Some("Enter a valid email address.".to_owned()),
    }
}

/// Applies `form` to the acting user's own record. There is no way to name
/// another user here.
pub async fn update_profile(
    db_pool: &SqlitePool,
    acting: &CurrentUser,
    form: &ProfileForm,
) -> AppResult<db::User> {
    let username = normalize_username(&form.username);
    let email = form.email.trim();

    let mut errors = validate_username(&username);
    errors.extend(validate_email(email));
    if errors.is_empty() {
        let holder = db::users::find_by_username(db_pool, &username).await?;
        if holder.is_some_and(|u| u.id != acting.id()) {
            errors.push("A user with that username already exists.".to_owned());
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let changes = ProfileChanges {
        username: &username,
        email,
        bio: form.bio.trim(),
    };
    match db::users::update_profile(db_pool, acting.id(), changes).await {
        Ok(user) => Ok(user),
        Err(e) if db::is_unique_violation(&e) => {
            Err(AppError::invalid("A user with that username already exists."))
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_form(viewer: &CurrentUser, form: &ProfileForm, errors: &[String]) -> AppResult<Html<String>> {
    let body = include_res!(str, "/pages/profiles/profile_form.html")
        .replace("{user_id}", &viewer.id().to_string())
        .replace("{errors}", &res::error_list(errors))
        .replace("{username}", &res::escape(&form.username))
        .replace("{email}", &res::escape(&form.email))
        .replace("{bio}", &res::escape(&form.bio));

    res::render(&viewer.session, Some(&viewer.user), "Edit profile", &body).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_profile_page(viewer: CurrentUser) -> AppResult<Response> {
    let form = ProfileForm {
        username: viewer.user.username.clone(),
        email: viewer.user.email.clone(),
        bio: viewer.user.bio.clone(),
    };
    Ok(render_form(&viewer, &form, &[]).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_profile(
    State(db_pool): State<SqlitePool>,
    viewer: CurrentUser,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    match update_profile(&db_pool, &viewer, &form).await {
        Ok(user) => {
            tracing::info!(user = %user.id, username = %user.username, "profile updated");
            Ok(Redirect::to(&format!("/profile/{}", user.id)).into_response())
        }
        Err(AppError::Validation(errors)) => {
            let page = render_form(&viewer, &form, &errors).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_email_is_fine() {
        assert_eq!(validate_email(""), None);
    }

    #[test]
    fn plausible_email_is_fine() {
        assert_eq!(validate_email("alice@example.com"), None);
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["alice", "@example.com", "alice@localhost", "a@b@c.com"] {
            assert!(validate_email(email).is_some(), "{email}");
        }
    }
}
