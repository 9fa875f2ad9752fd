use std::env;

use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_lifetime_minutes")]
    pub access_token_lifetime_minutes: i64,
    #[serde(default = "default_refresh_token_lifetime_days")]
    pub refresh_token_lifetime_days: i64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_lifetime_minutes() -> i64 {
    5
}

fn default_refresh_token_lifetime_days() -> i64 {
    1
}

impl JwtConfig {
    const MIN_SECRET_BYTES: usize = 32;

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            access_token_lifetime: chrono::Duration::minutes(self.access_token_lifetime_minutes),
            refresh_token_lifetime: chrono::Duration::days(self.refresh_token_lifetime_days),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < JwtConfig::MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                JwtConfig::MIN_SECRET_BYTES
            )));
        }
        if self.jwt.access_token_lifetime_minutes <= 0 || self.jwt.refresh_token_lifetime_days <= 0
        {
            return Err(ConfigError::Message(
                "token lifetimes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
