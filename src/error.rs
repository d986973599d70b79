use axum::{http::StatusCode, response::{IntoResponse, Redirect, Response}};

use crate::res;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad form input. Handlers render these next to the form; reaching
    /// `into_response` means nobody did.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// Bad credentials or no session.
    #[error("{0}")]
    Auth(String),

    #[error("You are not allowed here")]
    Permission,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, errors.join("\n")).into_response()
            }
            AppError::Auth(msg) => {
                tracing::debug!(%msg, "auth error, sending to login");
                Redirect::to("/login").into_response()
            }
            AppError::Permission => {
                (StatusCode::FORBIDDEN, "You are not allowed here").into_response()
            }
            AppError::NotFound(kind) => res::sorry(kind),
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
            }
        }
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(tokio::task::JoinError);
