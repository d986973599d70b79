use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db, AppError, AppResult};

pub const USER_ID: &str = "user_id";
pub const RETURN_URL: &str = "return_url";
pub const FLASHES: &str = "flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub text: String,
}

pub async fn flash(session: &Session, level: Level, text: impl Into<String>) -> AppResult<()> {
    let mut flashes: Vec<Flash> = session.get(FLASHES).await?.unwrap_or_default();
    flashes.push(Flash { level, text: text.into() });
    session.insert(FLASHES, flashes).await?;
    Ok(())
}

/// Drains the pending flashes; each is shown exactly once.
pub async fn take_flashes(session: &Session) -> AppResult<Vec<Flash>> {
    Ok(session.remove::<Vec<Flash>>(FLASHES).await?.unwrap_or_default())
}

/// Starts an authenticated session. The id is rotated so a session cookie
/// issued before login cannot ride along.
pub async fn log_in(session: &Session, user_id: Uuid) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await?;
    Ok(())
}

pub async fn log_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

pub async fn user_id(session: &Session) -> AppResult<Option<Uuid>> {
    Ok(session.get::<Uuid>(USER_ID).await?)
}

/// The signed-in user. Handlers taking this are login-gated: anonymous
/// visitors are sent to `/login` and come back here afterwards.
#[derive(Clone)]
pub struct CurrentUser {
    pub user: db::User,
    pub session: Session,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Like [`CurrentUser`] but never rejects.
#[derive(Clone)]
pub struct MaybeUser {
    pub user: Option<db::User>,
    pub session: Session,
}

impl MaybeUser {
    pub fn id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

async fn load_user(session: &Session, db_pool: &SqlitePool) -> AppResult<Option<db::User>> {
    let Some(user_id) = user_id(session).await? else {
        return Ok(None);
    };

    let user = db::users::get(db_pool, user_id).await?;
    if user.is_none() {
        // Stale session pointing at a user this database never had.
        session.remove::<Uuid>(USER_ID).await?;
    }
    Ok(user)
}

impl<S> FromRequestParts<S> for MaybeUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let db_pool = SqlitePool::from_ref(state);

        let user = load_user(&session, &db_pool)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(MaybeUser { user, session })
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser { user, session } = MaybeUser::from_request_parts(parts, state).await?;

        match user {
            Some(user) => Ok(CurrentUser { user, session }),
            None => {
                let return_url = parts.uri.path().to_owned();
                require_login(&session, return_url)
                    .await
                    .map_err(IntoResponse::into_response)?;
                Err(Redirect::to("/login").into_response())
            }
        }
    }
}

async fn require_login(session: &Session, return_url: String) -> AppResult<()> {
    session.insert(RETURN_URL, return_url).await?;
    flash(session, Level::Info, "Please log in first").await?;
    Ok(())
}

/// Where to go after a successful login.
pub async fn take_return_url(session: &Session) -> AppResult<String> {
    let url = session.remove::<String>(RETURN_URL).await?;
    Ok(url.filter(|u| is_local_path(u)).unwrap_or_else(|| "/".to_owned()))
}

fn is_local_path(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

pub fn ensure_owner(owner_id: Uuid, acting: &CurrentUser) -> AppResult<()> {
    if owner_id == acting.id() {
        Ok(())
    } else {
        tracing::warn!(user = %acting.user.username, %owner_id, "denied mutation of record owned by someone else");
        Err(AppError::Permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_paths_are_followed() {
        assert!(is_local_path("/room-create"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));
    }
}
