//! Configuration loading and validation.
//!
//! Settings are layered with [`figment`], lowest priority first:
//!
//! 1. Built-in defaults (see [`DatabaseConfig::default`]).
//! 2. A TOML file: either the path given explicitly, or `modcat.toml` in the
//!    platform configuration directory if it exists.
//! 3. Environment variables. Database settings keep the names the catalog has
//!    always been deployed with (`DB_HOST`, `DB_PORT`, `DB_USERNAME`,
//!    `DB_PWD`, `DB_NAME`, `DB_SOCKET_DIR`, plus `DB_SQLITE` for an embedded
//!    database), access settings use `MODCAT_ACCESS_*`.
//!
//! Loading never connects to anything. Whether the values are *usable* is
//! decided by [`Config::validate`] and the accessors it calls.

mod access;
mod database;
pub mod error;

pub use crate::access::{AccessConfig, KeySource};
pub use crate::database::{DatabaseConfig, Endpoint, Engine, PostgresSettings};

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use figment::value::{Uncased, UncasedStr};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// File name looked up in the platform configuration directory.
pub const CONFIG_FILE: &str = "modcat.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub access: AccessConfig,
}

impl Config {
    /// Build the layered provider without extracting it.
    ///
    /// Exposed so that binaries can merge their own providers (command-line
    /// overrides) on top before extraction.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(file) = path.map(Path::to_path_buf).or_else(default_path) {
            figment = figment.merge(Toml::file(file));
        }
        figment
            .merge(Env::prefixed("DB_").map(database_key))
            .merge(Env::prefixed("MODCAT_ACCESS_").map(|key| format!("access.{key}").into()))
    }

    /// Load and validate the configuration.
    #[instrument("loading configuration")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path
            && !path.exists()
        {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let config: Self = Self::figment(path).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that every mode of operation relies on.
    ///
    /// Database credentials are only checked when the selected engine needs
    /// them, and access settings are only checked for consistency: a crawl
    /// does not need a token verifier at all.
    pub fn validate(&self) -> Result<()> {
        self.database.engine()?;
        self.access.key()?;
        Ok(())
    }

    /// Namespace used to derive the name of the access claim.
    ///
    /// Defaults to the database name so that one identity provider can serve
    /// several catalogs without their grants colliding.
    pub fn claim_namespace(&self) -> Option<&str> {
        self.access.namespace.as_deref().or(self.database.name.as_deref())
    }
}

/// `DB_PWD` is the deployed name of `database.password`.
fn database_key(key: &UncasedStr) -> Uncased<'_> {
    if key == "pwd" {
        "database.password".into()
    } else {
        format!("database.{key}").into()
    }
}

fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("net", "openconfig", "modcat").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    [database]
                    host = "catalog-instance"
                    port = 6543
                    username = "file-user"
                    password = "file-password"
                    name = "catalog"
                "#,
            )?;
            jail.set_env("DB_USERNAME", "env-user");
            jail.set_env("DB_PWD", "env-password");
            let config: Config = Config::figment(Some(Path::new(CONFIG_FILE))).extract()?;
            assert_eq!(config.database.host, "catalog-instance");
            assert_eq!(config.database.port, 6543);
            assert_eq!(config.database.username.as_deref(), Some("env-user"));
            assert_eq!(config.database.password.as_deref(), Some("env-password"));
            Ok(())
        });
    }

    #[test]
    fn test_load_with_password_in_file_and_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    [database]
                    username = "catalog"
                    password = "file-password"
                    name = "catalog"
                "#,
            )?;
            jail.set_env("DB_PWD", "env-password");
            let config = Config::load(Some(Path::new(CONFIG_FILE))).unwrap();
            assert_eq!(config.database.password.as_deref(), Some("env-password"));
            Ok(())
        });
    }

    #[test]
    fn test_claim_namespace_defaults_to_database_name() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "")?;
            jail.set_env("DB_NAME", "catalog-staging");
            let config: Config = Config::figment(Some(Path::new(CONFIG_FILE))).extract()?;
            assert_eq!(config.claim_namespace(), Some("catalog-staging"));
            jail.set_env("MODCAT_ACCESS_NAMESPACE", "shared");
            let config: Config = Config::figment(Some(Path::new(CONFIG_FILE))).extract()?;
            assert_eq!(config.claim_namespace(), Some("shared"));
            Ok(())
        });
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here/modcat.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_validate_requires_credentials_for_postgres() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[database]\nname = \"catalog\"\n")?;
            let config: Config = Config::figment(Some(Path::new(CONFIG_FILE))).extract()?;
            let err = config.validate().unwrap_err();
            assert_eq!(*err, ErrorKind::Missing("DB_USERNAME"));
            Ok(())
        });
    }

    #[test]
    fn test_validate_sqlite_needs_no_credentials() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "")?;
            jail.set_env("DB_SQLITE", "catalog.db");
            let config: Config = Config::figment(Some(Path::new(CONFIG_FILE))).extract()?;
            assert!(config.validate().is_ok());
            Ok(())
        });
    }
}
