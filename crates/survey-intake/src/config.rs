use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::AppError;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DIGEST_FILE: &str = "best_quotes.html";

/// Application configuration loaded explicitly from environment variables.
///
/// No default is assumed for the data directory; the caller must provide it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON stores and the rendered quote digest.
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// File name of the quote digest inside `data_dir`.
    pub digest_file: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `SURVEY_DATA_DIR`: existing directory for the stores
    ///
    /// Optional:
    /// - `SURVEY_LISTEN_ADDR`: bind address (default `127.0.0.1:8080`)
    /// - `SURVEY_DIGEST_FILE`: digest file name (default `best_quotes.html`)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let data_dir = lookup("SURVEY_DATA_DIR").ok_or_else(|| {
            AppError::Config("SURVEY_DATA_DIR environment variable is required".to_string())
        })?;
        let data_dir = PathBuf::from(data_dir);
        if !data_dir.is_dir() {
            return Err(AppError::Config(format!(
                "data directory not found: {}",
                data_dir.display()
            )));
        }

        let listen_addr = lookup("SURVEY_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr.parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("invalid SURVEY_LISTEN_ADDR {listen_addr:?}: {e}"))
        })?;

        let digest_file =
            lookup("SURVEY_DIGEST_FILE").unwrap_or_else(|| DEFAULT_DIGEST_FILE.to_string());
        if digest_file.is_empty() || Path::new(&digest_file).components().count() != 1 {
            return Err(AppError::Config(format!(
                "SURVEY_DIGEST_FILE must be a plain file name, got {digest_file:?}"
            )));
        }

        Ok(Self {
            data_dir,
            listen_addr,
            digest_file,
        })
    }

    /// Returns the full path to the quote digest.
    pub fn digest_path(&self) -> PathBuf {
        self.data_dir.join(&self.digest_file)
    }
}
