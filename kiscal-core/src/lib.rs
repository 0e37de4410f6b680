//! Core types for the kiscal calendar server.
//!
//! This crate provides everything the server needs apart from HTTP:
//! - `credentials` for the username/secret store loaded at startup
//! - `auth` for Basic credential parsing and verification
//! - `path` for mapping request paths to traversal-safe calendar locations
//! - `storage` for reading and atomically replacing calendar files
//! - `config` for server settings

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod path;
pub mod storage;

pub use auth::Identity;
pub use crate::config::ServerConfig;
pub use credentials::CredentialStore;
pub use error::{KiscalError, KiscalResult};
pub use path::CalendarPath;
pub use storage::CalendarStore;
