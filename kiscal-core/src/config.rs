//! Server configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{KiscalError, KiscalResult};

pub const DEFAULT_CONFIG_FILE: &str = "kiscal.toml";

/// Prefix for environment overrides, e.g. `KISCAL_PORT=9000`.
const ENV_PREFIX: &str = "KISCAL";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("calendars")
}

fn default_users_file() -> PathBuf {
    PathBuf::from("users.json")
}

fn default_index_file() -> PathBuf {
    PathBuf::from("index.html")
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

/// Settings read from `kiscal.toml`, `KISCAL_*` environment variables and
/// command-line flags, in increasing order of precedence.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Root of the calendar tree: one subdirectory per owner.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON object mapping usernames to secrets.
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,

    /// Page served verbatim at `/`.
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,

    /// Largest accepted PUT body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Default, Clone, Debug)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub users_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from `config_file` (if it exists), the environment
    /// and `overrides`.
    pub fn load(config_file: &Path, overrides: &ConfigOverrides) -> KiscalResult<Self> {
        Self::build(
            config_file,
            Some(Environment::with_prefix(ENV_PREFIX).try_parsing(true)),
            overrides,
        )
    }

    fn build(
        config_file: &Path,
        env: Option<Environment>,
        overrides: &ConfigOverrides,
    ) -> KiscalResult<Self> {
        let mut builder = Config::builder().add_source(
            File::from(config_file)
                .format(FileFormat::Toml)
                .required(false),
        );

        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let config: ServerConfig = builder
            .set_override_option("host", overrides.host.clone())
            .and_then(|b| b.set_override_option("port", overrides.port.map(i64::from)))
            .and_then(|b| b.set_override_option("data_dir", path_value(&overrides.data_dir)))
            .and_then(|b| b.set_override_option("users_file", path_value(&overrides.users_file)))
            .map_err(|e| KiscalError::Config(e.to_string()))?
            .build()
            .map_err(|e| KiscalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| KiscalError::Config(e.to_string()))?;

        if config.max_body_bytes == 0 {
            return Err(KiscalError::Config(
                "max_body_bytes must be greater than zero".into(),
            ));
        }

        Ok(config)
    }

    /// Address for the listener, e.g. `0.0.0.0:8080`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn users_path(&self) -> PathBuf {
        expand(&self.users_file)
    }

    pub fn index_path(&self) -> PathBuf {
        expand(&self.index_file)
    }
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().into_owned())
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
