use std::{
    convert::{TryFrom, TryInto},
    time::Duration,
};

use config::{Config, ConfigError};
use serde::Deserialize;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    PgPool,
};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    /// Relay live events through a message broker. Events stay local to this instance if unset.
    #[serde(default)]
    pub broker: Option<BrokerSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub require_ssl: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Fanout exchange shared by all application instances.
    pub exchange: String,
}

impl DatabaseSettings {
    ///
    /// Get [PgConnectOptions](sqlx::postgres::PgConnectOptions) without a specific database.
    ///
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .username(&self.username)
            .password(&self.password)
            .host(&self.host)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    ///
    /// Get [PgConnectOptions](sqlx::postgres::PgConnectOptions) with the database specified in the settings.
    ///
    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

impl BrokerSettings {
    pub fn get_connection_string(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

///
/// Available settings environments
///
#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
    Testing,
}

impl Environment {
    ///
    /// Get the string representation for an enum.
    /// This can be used to load the settings files.
    ///
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
            Environment::Testing => "testing",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            "testing" => Ok(Self::Testing),
            other => Err(format!("Unknown environment {:?}!", other)),
        }
    }
}

///
/// Get an instance of the settings.
///
/// This uses the current `APP_ENV` to determine the settings file to load.
/// Values can be overridden with `APP_` prefixed environment variables, e.g. `APP_DATABASE__PORT`.
///
pub fn get_settings() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|error| ConfigError::Message(format!("No current directory: {}", error)))?;
    let settings_directory = base_path.join("settings");

    let environment: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    Config::builder()
        .add_source(config::File::from(settings_directory.join("base")).required(true))
        .add_source(
            config::File::from(settings_directory.join(environment.as_str())).required(true),
        )
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?
        .try_deserialize()
}

///
/// Get a [`PgPool`] from the supplied [`DatabaseSettings`].
///
/// Also sets a default timeout of 5 seconds.
///
pub async fn get_db_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .connect_timeout(Duration::from_secs(5))
        .connect_with(settings.with_db())
        .await
}
