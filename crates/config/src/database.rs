use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use serde::Deserialize;
use std::path::PathBuf;

const LOCALHOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_SOCKET_DIR: &str = "/cloudsql";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Raw database settings, as read from the configuration layers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to an embedded SQLite database (or `:memory:`). When set, the
    /// PostgreSQL settings below are ignored.
    pub sqlite: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    /// Directory containing the Unix socket of a managed (Cloud SQL) instance.
    pub socket_dir: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite: None,
            host: LOCALHOST.to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            name: None,
            socket_dir: PathBuf::from(DEFAULT_SOCKET_DIR),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Which storage engine the settings select, with everything it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine {
    Sqlite(PathBuf),
    Postgres(PostgresSettings),
}

/// How to reach a PostgreSQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Plain TCP, used for `localhost` (directly, or through a local proxy).
    Tcp(String),
    /// Unix socket directory: `<socket_dir>/<host>`, which is how managed
    /// instances are exposed to the services running next to them.
    Socket(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub endpoint: Endpoint,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Resolve the settings into a usable [`Engine`].
    pub fn engine(&self) -> Result<Engine> {
        if let Some(path) = &self.sqlite {
            return Ok(Engine::Sqlite(path.clone()));
        }
        if self.host.is_empty() {
            exn::bail!(ErrorKind::Invalid("DB_HOST"));
        }
        if self.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid("max_connections"));
        }
        let username = self.username.clone().ok_or_raise(|| ErrorKind::Missing("DB_USERNAME"))?;
        let password = self.password.clone().ok_or_raise(|| ErrorKind::Missing("DB_PWD"))?;
        let database = self.name.clone().ok_or_raise(|| ErrorKind::Missing("DB_NAME"))?;
        let endpoint = match self.host.as_str() {
            LOCALHOST => Endpoint::Tcp(self.host.clone()),
            host => Endpoint::Socket(self.socket_dir.join(host)),
        };
        Ok(Engine::Postgres(PostgresSettings {
            endpoint,
            port: self.port,
            username,
            password,
            database,
            max_connections: self.max_connections,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn credentials(host: &str) -> DatabaseConfig {
        DatabaseConfig {
            host: host.to_string(),
            username: Some("catalog".to_string()),
            password: Some("hunter2".to_string()),
            name: Some("catalog".to_string()),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.socket_dir, PathBuf::from("/cloudsql"));
    }

    #[rstest]
    #[case("localhost", Endpoint::Tcp("localhost".to_string()))]
    #[case("project:region:instance", Endpoint::Socket(PathBuf::from("/cloudsql/project:region:instance")))]
    fn test_endpoint(#[case] host: &str, #[case] expected: Endpoint) {
        let Engine::Postgres(settings) = credentials(host).engine().unwrap() else {
            panic!("expected a PostgreSQL engine");
        };
        assert_eq!(settings.endpoint, expected);
        assert_eq!(settings.database, "catalog");
    }

    #[rstest]
    #[case::username(DatabaseConfig { username: None, ..credentials("localhost") }, "DB_USERNAME")]
    #[case::password(DatabaseConfig { password: None, ..credentials("localhost") }, "DB_PWD")]
    #[case::name(DatabaseConfig { name: None, ..credentials("localhost") }, "DB_NAME")]
    fn test_missing_setting(#[case] config: DatabaseConfig, #[case] setting: &'static str) {
        let err = config.engine().unwrap_err();
        assert_eq!(*err, ErrorKind::Missing(setting));
    }

    #[test]
    fn test_sqlite_takes_precedence() {
        let config = DatabaseConfig {
            sqlite: Some(PathBuf::from(":memory:")),
            ..credentials("localhost")
        };
        assert_eq!(config.engine().unwrap(), Engine::Sqlite(PathBuf::from(":memory:")));
    }
}
