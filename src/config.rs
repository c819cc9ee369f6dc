//! Configuration: `config.toml` under the user config directory when
//! present, then `TICKLIST_*` environment overrides (`.env` supported).

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API server binds to.
    pub bind: String,
    /// SQLite database file backing the store.
    pub database: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            database: default_database_path(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL the terminal client talks to.
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, String> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
                toml::from_str(&raw)
                    .map_err(|err| format!("invalid config {}: {err}", path.display()))?
            }
            _ => Self::default(),
        };

        if let Ok(bind) = env::var("TICKLIST_BIND") {
            config.server.bind = bind;
        }
        if let Ok(database) = env::var("TICKLIST_DB") {
            config.server.database = PathBuf::from(database);
        }
        if let Ok(url) = env::var("TICKLIST_URL") {
            config.client.server_url = url;
        }
        Ok(config)
    }
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ticklist").join("config.toml"))
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ticklist")
        .join("todos.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_local() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.client.server_url, "http://127.0.0.1:8080");
        assert!(config.server.database.ends_with("todos.db"));
    }

    #[test]
    fn partial_config_file_keeps_defaults_for_the_rest() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind = "0.0.0.0:9090"
            "#,
        )
        .expect("parse");
        assert_eq!(config.server.bind, "0.0.0.0:9090");
        assert!(config.server.database.ends_with("todos.db"));
        assert_eq!(config.client.server_url, "http://127.0.0.1:8080");
    }
}
