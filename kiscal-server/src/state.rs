use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiscal_core::{CalendarStore, CredentialStore};

/// Shared application state
///
/// Everything in here is read-only once the server is running; calendars
/// themselves live on disk and are read fresh on every request.
#[derive(Clone)]
pub struct AppState {
    credentials: Arc<CredentialStore>,
    store: Arc<CalendarStore>,
    index_file: Arc<PathBuf>,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        credentials: CredentialStore,
        store: CalendarStore,
        index_file: PathBuf,
        max_body_bytes: usize,
    ) -> Self {
        AppState {
            credentials: Arc::new(credentials),
            store: Arc::new(store),
            index_file: Arc::new(index_file),
            max_body_bytes,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn store(&self) -> Arc<CalendarStore> {
        Arc::clone(&self.store)
    }

    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}
