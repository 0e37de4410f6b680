//! HTTP Basic authentication extractor

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use kiscal_core::{Identity, auth};

use crate::routes::AppError;
use crate::state::AppState;

/// Identity verified from the request's `Authorization` header.
///
/// Taking this as a handler argument makes the handler require credentials;
/// a missing or wrong header is rejected with 401 and a Basic challenge
/// before the handler runs.
pub struct Authenticated(pub Identity);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let identity = auth::authenticate(header, state.credentials())?;

        Ok(Authenticated(identity))
    }
}
