//! Runtime configuration of the server.
//!
//! Every setting has a default suited to a single-office install and can be
//! overridden through a `TIMESHEET_*` environment variable.

use log::warn;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "timesheet.sqlite";
const DEFAULT_SESSION_FILE: &str = "session.json";
const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the five collections.
    pub database_path: PathBuf,
    /// Where the last signed-in person is remembered between restarts.
    pub session_path: PathBuf,
    pub json_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE),
            session_path: PathBuf::from(DEFAULT_SESSION_FILE),
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("TIMESHEET_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "TIMESHEET_PORT").unwrap_or(defaults.port),
            database_path: lookup("TIMESHEET_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            session_path: lookup("TIMESHEET_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            json_limit: parsed(&lookup, "TIMESHEET_JSON_LIMIT").unwrap_or(defaults.json_limit),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
