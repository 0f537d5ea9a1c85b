//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const LOCAL_CONFIG_BASENAME: &str = "prefstore";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Command-line arguments for the prefstore binary.
#[derive(Debug, Parser)]
#[command(name = "prefstore", version, about = "Preference store server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PREFSTORE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the prefstore HTTP service.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Override the log format (compact|json).
    #[arg(long = "log-format", value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Override the admin API token.
    #[arg(long = "admin-token", env = "PREFSTORE_ADMIN_TOKEN", value_name = "TOKEN")]
    pub admin_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("invalid setting `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl SettingsError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| SettingsError::invalid("server.host", format!("{err}")))
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub identity: IdentitySettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
    pub admin_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    server: RawServer,
    database: RawDatabase,
    identity: RawIdentity,
    cache: RawCache,
    logging: RawLogging,
    admin_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: String,
    port: u16,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    url: String,
    max_connections: u32,
}

#[derive(Debug, Deserialize)]
struct RawIdentity {
    request_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    capacity: usize,
}

#[derive(Debug, Deserialize)]
struct RawLogging {
    level: String,
    format: String,
}

impl Settings {
    /// Layered load: built-in defaults, then an optional TOML file, then
    /// `PREFSTORE_`-prefixed environment variables, then CLI overrides.
    pub fn load(
        config_file: Option<&PathBuf>,
        overrides: &ServeOverrides,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", DEFAULT_PORT)?
            .set_default("database.url", "postgres://localhost/prefstore")?
            .set_default("database.max_connections", DEFAULT_DB_MAX_CONNECTIONS)?
            .set_default("identity.request_timeout_secs", DEFAULT_IDENTITY_TIMEOUT_SECS)?
            .set_default("cache.capacity", DEFAULT_CACHE_CAPACITY as u64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "compact")?;

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path.clone())),
            None => builder.add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("PREFSTORE")
                .separator("__")
                .try_parsing(true),
        );

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        let mut settings = Settings::try_from(raw)?;
        settings.apply_overrides(overrides)?;
        Ok(settings)
    }

    fn apply_overrides(&mut self, overrides: &ServeOverrides) -> Result<(), SettingsError> {
        if let Some(host) = &overrides.server_host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(url) = &overrides.database_url {
            self.database.url = url.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = parse_level(level)?;
        }
        if let Some(format) = &overrides.log_format {
            self.logging.format = format
                .parse()
                .map_err(|message| SettingsError::invalid("logging.format", message))?;
        }
        if let Some(token) = &overrides.admin_token {
            self.admin_token = Some(token.clone());
        }
        Ok(())
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = SettingsError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            server: ServerSettings {
                host: raw.server.host,
                port: raw.server.port,
            },
            database: DatabaseSettings {
                url: raw.database.url,
                max_connections: raw.database.max_connections,
            },
            identity: IdentitySettings {
                request_timeout: Duration::from_secs(raw.identity.request_timeout_secs),
            },
            cache: CacheSettings {
                capacity: raw.cache.capacity,
            },
            logging: LoggingSettings {
                level: parse_level(&raw.logging.level)?,
                format: raw
                    .logging
                    .format
                    .parse()
                    .map_err(|message| SettingsError::invalid("logging.format", message))?,
            },
            admin_token: raw.admin_token,
        })
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, SettingsError> {
    LevelFilter::from_str(raw)
        .map_err(|err| SettingsError::invalid("logging.level", err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let settings = Settings::load(None, &ServeOverrides::default()).expect("defaults load");

        assert_eq!(settings.server.host, DEFAULT_HOST);
        assert_eq!(settings.server.port, DEFAULT_PORT);
        assert_eq!(settings.cache.capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(settings.logging.level, LevelFilter::INFO);
        assert_eq!(settings.logging.format, LogFormat::Compact);
        assert!(settings.admin_token.is_none());
    }

    #[test]
    fn cli_overrides_win() {
        let overrides = ServeOverrides {
            server_port: Some(4000),
            log_level: Some("debug".to_string()),
            log_format: Some("json".to_string()),
            admin_token: Some("secret".to_string()),
            ..Default::default()
        };
        let settings = Settings::load(None, &overrides).expect("load with overrides");

        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.admin_token.as_deref(), Some("secret"));
    }

    #[test]
    fn bad_log_format_is_rejected() {
        let overrides = ServeOverrides {
            log_format: Some("yaml".to_string()),
            ..Default::default()
        };
        let err = Settings::load(None, &overrides).expect_err("bad format");
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "logging.format",
                ..
            }
        ));
    }

    #[test]
    fn bind_addr_parses() {
        let settings = Settings::load(None, &ServeOverrides::default()).expect("defaults load");
        let addr = settings.server.bind_addr().expect("valid addr");
        assert_eq!(addr.port(), DEFAULT_PORT);
    }
}
