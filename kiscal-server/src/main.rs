mod routes;
mod state;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use kiscal_core::config::{ConfigOverrides, DEFAULT_CONFIG_FILE};
use kiscal_core::{CalendarStore, CredentialStore, KiscalError, ServerConfig};

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "kiscal-server")]
#[command(about = "Serve calendars at /{user}/{calendar}.ics: public reads, authenticated writes")]
struct Cli {
    /// Configuration file (TOML). Missing is fine; defaults apply.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding one subdirectory per user
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file mapping usernames to passwords
    #[arg(long)]
    users_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            data_dir: self.data_dir.clone(),
            users_file: self.users_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = ServerConfig::load(&cli.config, &cli.overrides())?;

    let credentials = load_credentials(&config.users_path())?;

    let store = CalendarStore::create(config.data_path())
        .context("Failed to create data directory")?;
    let data_root = store.root().to_path_buf();

    let state = AppState::new(
        credentials,
        store,
        config.index_path(),
        config.max_body_bytes,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to listen on {}", config.listen_addr()))?;

    tracing::info!("kiscal-server listening on http://{}", listener.local_addr()?);
    tracing::info!("storing calendar files in {}", data_root.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,kiscal_core=info,tower_http=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .init();
}

/// Load the user file, creating a placeholder and stopping if there is none.
fn load_credentials(path: &Path) -> Result<CredentialStore> {
    match CredentialStore::load(path) {
        Ok(credentials) => {
            if credentials.is_empty() {
                tracing::warn!("'{}' has no users; every write will be rejected", path.display());
            }
            Ok(credentials)
        }
        Err(KiscalError::CredentialsNotFound(path)) => {
            tracing::warn!("User file '{}' not found.", path.display());
            CredentialStore::write_placeholder(&path)
                .context("Could not write default user file")?;
            anyhow::bail!(
                "A default '{}' has been created. Please edit it with real credentials and restart the server.",
                path.display()
            )
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load users")),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
