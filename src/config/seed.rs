//! Seed configuration loading from config.toml
//!
//! The store is seeded with one administrator account on first run. Its
//! credentials come from the `[admin]` table of `config.toml`; a missing file
//! or table falls back to the built-in defaults.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Administrator account created on first run
    #[serde(default)]
    pub admin: AdminConfig,
}

/// The administrator account written into an empty store
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            name: "Administrator".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// Loads the seed configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `CLUB_LEDGER_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: the defaults are used instead.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("CLUB_LEDGER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        info!("No config file at {}, using built-in defaults.", path);
        return Ok(Config::default());
    }
    load_config(path)
}
