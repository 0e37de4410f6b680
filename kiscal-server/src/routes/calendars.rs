//! Calendar endpoints
//!
//! `GET /{owner}/{name}.ics` is public. `PUT` requires Basic credentials for
//! the same `{owner}` and replaces the whole document.

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Path, State, rejection::PathRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio_util::io::ReaderStream;

use kiscal_core::{CalendarPath, KiscalError};

use crate::routes::AppError;
use crate::routes::auth::Authenticated;
use crate::state::AppState;

pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{*path}",
        get(get_calendar).head(method_not_allowed).put(put_calendar),
    )
}

/// GET /{owner}/{name}.ics - Stream a calendar to anyone
async fn get_calendar(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(path) = path.map_err(|e| KiscalError::NotFound(e.body_text()))?;
    let calendar = CalendarPath::resolve(&path)
        .map_err(|_| KiscalError::NotFound(format!("/{path}")))?;

    let store = state.store();
    let (file, len) = tokio::task::spawn_blocking(move || store.open(&calendar)).await??;

    let stream = ReaderStream::new(tokio::fs::File::from_std(file));

    Ok((
        [(header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE)],
        [(header::CONTENT_LENGTH, len.to_string())],
        Body::from_stream(stream),
    )
        .into_response())
}

/// PUT /{owner}/{name}.ics - Create or replace one of the caller's calendars
async fn put_calendar(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let Path(path) = path.map_err(|e| KiscalError::InvalidPath(e.body_text()))?;
    let calendar = CalendarPath::resolve(&path)?;

    if !identity.owns(calendar.owner()) {
        tracing::warn!(
            user = identity.username(),
            owner = calendar.owner(),
            "rejected write to another user's calendar"
        );
        return Err(KiscalError::Forbidden {
            owner: calendar.owner().to_string(),
            user: identity.username().to_string(),
        }
        .into());
    }

    let owner = calendar.owner().to_string();
    let name = calendar.name();
    let bytes = body.len();

    let store = state.store();
    let written = tokio::task::spawn_blocking(move || store.write(&calendar, &body)).await??;

    tracing::info!(%owner, %name, bytes, path = %written.display(), "updated calendar");

    Ok(StatusCode::NO_CONTENT)
}

/// HEAD /{owner}/{name}.ics - Only GET and PUT are served; without this
/// route axum would answer HEAD with the GET handler
async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET,PUT")])
}
