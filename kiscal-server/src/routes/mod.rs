pub mod auth;
pub mod calendars;
pub mod index;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use kiscal_core::{KiscalError, auth::challenge};

use crate::state::AppState;

/// All routes, with the body limit taken from the state.
pub fn app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes());

    Router::new()
        .merge(index::router())
        .merge(calendars::router())
        .layer(body_limit)
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses.
///
/// Known `KiscalError`s map to client errors; anything else is logged and
/// reported as a bare 500 so no internal detail reaches the client.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<KiscalError>() {
            Some(KiscalError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            Some(KiscalError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            Some(KiscalError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            Some(KiscalError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
            "Internal Server Error".to_string()
        } else {
            self.0.to_string()
        };

        let mut response = (status, Json(ErrorResponse { error })).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(value) = HeaderValue::from_str(&challenge()) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
