// Runtime configuration read from the environment

use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DB_PATH: &str = "expenses.db";
pub const DEFAULT_CATEGORIES_PATH: &str = "categories.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub categories_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            categories_path: PathBuf::from(DEFAULT_CATEGORIES_PATH),
        }
    }
}

impl Config {
    /// Read `HOST`, `PORT`, `EXPENSES_DB_PATH` and `EXPENSES_CATEGORIES_PATH`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. A `PORT` that does not parse falls back to
    /// the default instead of failing startup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!(value = %raw, "PORT is not a valid port, using {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Config {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            db_path: lookup("EXPENSES_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            categories_path: lookup("EXPENSES_CATEGORIES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.categories_path),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
