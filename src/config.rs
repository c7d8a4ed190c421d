//! Runtime configuration, read from environment variables.
//!
//! `main` loads a `.env` file first, so any of these can live there too.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://clubhouse.db?mode=rwc";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    /// The port the HTTP server listens on
    pub port: u16,
    /// Where the database lives
    pub database_url: String,
    /// Where uploaded images are written, served under `/uploads`
    pub upload_dir: PathBuf,
    /// The public site and admin dashboard files
    pub static_dir: PathBuf,
    /// The largest image upload accepted, in bytes
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: load("PORT", DEFAULT_PORT),
            database_url: load("DATABASE_URL", DEFAULT_DATABASE_URL.to_owned()),
            upload_dir: PathBuf::from(load("UPLOAD_DIR", DEFAULT_UPLOAD_DIR.to_owned())),
            static_dir: PathBuf::from(load("STATIC_DIR", DEFAULT_STATIC_DIR.to_owned())),
            max_upload_bytes: load("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

fn load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|err| {
            warn!("Invalid {key} value {value:?} ({err}), using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
