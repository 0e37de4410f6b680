//! Web interface page

use axum::{
    Router,
    extract::State,
    response::Html,
    routing::get,
};

use kiscal_core::KiscalError;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET / - Serve the index page verbatim
async fn index(State(state): State<AppState>) -> Result<Html<Vec<u8>>, AppError> {
    match tokio::fs::read(state.index_file()).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(KiscalError::NotFound("/".into()).into())
        }
        Err(e) => Err(e.into()),
    }
}
