//! Runtime configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! | Variable             | Default       | Description                           |
//! |----------------------|---------------|---------------------------------------|
//! | `SHOPKEEP_DATABASE`  | `shopkeep.db` | SQLite database file                  |
//! | `SHOPKEEP_LOG_LEVEL` | `info`        | Minimum log level                     |
//! | `SHOPKEEP_PAGE_SIZE` | `10`          | Rows per page in list views           |
//!
//! ```toml
//! database = "/var/lib/shopkeep/shop.db"
//! log_level = "debug"
//! page_size = 25
//! latest_users = 5
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::log::Level;
use crate::{Error, Result};

/// Environment variable naming the database file.
pub const ENV_DATABASE: &str = "SHOPKEEP_DATABASE";
/// Environment variable naming the minimum log level.
pub const ENV_LOG_LEVEL: &str = "SHOPKEEP_LOG_LEVEL";
/// Environment variable setting the list page size.
pub const ENV_PAGE_SIZE: &str = "SHOPKEEP_PAGE_SIZE";

const DEFAULT_DATABASE: &str = "shopkeep.db";
const DEFAULT_PAGE_SIZE: i64 = shopkeep_sql::DEFAULT_LIMIT;
const DEFAULT_LATEST_USERS: i64 = crate::users::DEFAULT_LATEST_USERS;

/// Admin panel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite database file.
    pub database: PathBuf,
    /// Minimum log level.
    pub log_level: Level,
    /// Rows per page in list views. Must be positive.
    pub page_size: i64,
    /// Number of users on the dashboard's "latest" panel.
    pub latest_users: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            log_level: Level::Info,
            page_size: DEFAULT_PAGE_SIZE,
            latest_users: DEFAULT_LATEST_USERS,
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.check()
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from an optional file, then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let env: Vec<(String, String)> = std::env::vars().collect();
        base.with_env(&env)
    }

    /// Apply `SHOPKEEP_*` overrides from an environment snapshot.
    pub fn with_env(mut self, env: &[(String, String)]) -> Result<Self> {
        if let Some(database) = env_get(env, ENV_DATABASE) {
            self.database = PathBuf::from(database);
        }
        if let Some(level) = env_get(env, ENV_LOG_LEVEL) {
            self.log_level = level
                .parse()
                .map_err(|e| Error::config(format!("{ENV_LOG_LEVEL}: {e}")))?;
        }
        if let Some(size) = env_get(env, ENV_PAGE_SIZE) {
            self.page_size = size.trim().parse().map_err(|_| {
                Error::config(format!("{ENV_PAGE_SIZE}: '{size}' is not an integer"))
            })?;
        }
        self.check()
    }

    fn check(self) -> Result<Self> {
        if self.page_size <= 0 {
            return Err(Error::config("page_size must be positive"));
        }
        if self.latest_users <= 0 {
            return Err(Error::config("latest_users must be positive"));
        }
        Ok(self)
    }
}

fn env_get<'a>(env: &'a [(String, String)], name: &str) -> Option<&'a str> {
    env.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database, PathBuf::from("shopkeep.db"));
        assert_eq!(config.log_level, Level::Info);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.latest_users, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("log_level = \"debug\"\npage_size = 25\n").unwrap();
        assert_eq!(config.log_level, Level::Debug);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.database, PathBuf::from("shopkeep.db"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("databse = \"x.db\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_non_positive_page_size_rejected() {
        assert!(Config::from_toml_str("page_size = 0").is_err());
        assert!(Config::from_toml_str("page_size = -3").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::from_toml_str("database = \"file.db\"\npage_size = 25")
            .unwrap()
            .with_env(&env(&[
                ("SHOPKEEP_DATABASE", "env.db"),
                ("SHOPKEEP_LOG_LEVEL", "warn"),
                ("SHOPKEEP_PAGE_SIZE", "50"),
                ("UNRELATED", "x"),
            ]))
            .unwrap();
        assert_eq!(config.database, PathBuf::from("env.db"));
        assert_eq!(config.log_level, Level::Warn);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_empty_env_value_ignored() {
        let config = Config::default()
            .with_env(&env(&[("SHOPKEEP_DATABASE", "")]))
            .unwrap();
        assert_eq!(config.database, PathBuf::from("shopkeep.db"));
    }

    #[test]
    fn test_bad_env_values_rejected() {
        assert!(
            Config::default()
                .with_env(&env(&[("SHOPKEEP_PAGE_SIZE", "ten")]))
                .is_err()
        );
        assert!(
            Config::default()
                .with_env(&env(&[("SHOPKEEP_LOG_LEVEL", "loud")]))
                .is_err()
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopkeep.toml");
        std::fs::write(&path, "latest_users = 3\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.latest_users, 3);

        let missing = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, Error::ConfigRead { .. }));
    }
}
