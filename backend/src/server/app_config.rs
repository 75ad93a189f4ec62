//! Application configuration parsing and validation.
//!
//! This module centralises the environment-driven settings so they are
//! validated consistently and can be tested in isolation via the
//! [`mockable::Env`] abstraction.

use std::net::{Ipv4Addr, SocketAddr};

use mockable::Env;

const DATABASE_URL_ENV: &str = "DATABASE_URL";
const PORT_ENV: &str = "PORT";
const APP_ENV_ENV: &str = "APP_ENV";
const SECRET_KEY_ENV: &str = "SECRET_KEY";

const DEFAULT_PORT: u16 = 8000;
const ENVIRONMENT_EXPECTED: &str = "development|production";
const PORT_EXPECTED: &str = "a TCP port between 1 and 65535";

/// Placeholder secret shipped in development templates; rejected in
/// production so deployments cannot run with it by accident.
const DEV_SECRET_PLACEHOLDER: &str = "dev-secret-key";

/// Deployment environment the service believes it is running in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    /// Local development; relaxed secret validation.
    Development,
    /// Default for any deployment; placeholder secrets are rejected.
    Production,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "development" => Some(Self::Development),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    /// Whether this is the production environment.
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Errors raised while validating application configuration.
#[derive(thiserror::Error, Debug)]
pub enum AppConfigError {
    /// A required environment variable is missing or empty.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The placeholder signing secret is not allowed in production.
    #[error("SECRET_KEY must not be the development placeholder in production")]
    PlaceholderSecret,
}

/// Validated application settings.
#[derive(Debug)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// TCP port the HTTP listener binds to.
    pub port: u16,
    /// Deployment environment.
    pub environment: Environment,
    /// Signing secret, validated and held for deployment parity. No
    /// endpoint in this service consumes it yet.
    #[expect(dead_code, reason = "validated at startup; reserved for signed tokens")]
    secret_key: String,
}

impl AppConfig {
    /// Build application settings from environment variables.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::server::AppConfig;
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "DATABASE_URL" => Some("postgres://localhost/users".to_string()),
    ///     "SECRET_KEY" => Some("s3cr3t".to_string()),
    ///     _ => None,
    /// });
    ///
    /// let config = AppConfig::from_env(&env).expect("valid config");
    /// assert_eq!(config.port, 8000);
    /// ```
    ///
    /// # Errors
    /// Returns [`AppConfigError`] when a required variable is missing or a
    /// value fails validation.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, AppConfigError> {
        let database_url = required_from_env(env, DATABASE_URL_ENV)?;
        let port = port_from_env(env)?;
        let environment = environment_from_env(env)?;
        let secret_key = secret_key_from_env(env, environment)?;

        Ok(Self {
            database_url,
            port,
            environment,
            secret_key,
        })
    }

    /// Socket address the HTTP listener binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn required_from_env<E: Env>(env: &E, name: &'static str) -> Result<String, AppConfigError> {
    match env.string(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppConfigError::MissingEnv { name }),
    }
}

fn port_from_env<E: Env>(env: &E) -> Result<u16, AppConfigError> {
    let Some(value) = env.string(PORT_ENV) else {
        return Ok(DEFAULT_PORT);
    };
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(AppConfigError::InvalidEnv {
            name: PORT_ENV,
            value,
            expected: PORT_EXPECTED,
        }),
    }
}

fn environment_from_env<E: Env>(env: &E) -> Result<Environment, AppConfigError> {
    let Some(value) = env.string(APP_ENV_ENV) else {
        return Ok(Environment::Production);
    };
    Environment::parse(&value).ok_or(AppConfigError::InvalidEnv {
        name: APP_ENV_ENV,
        value,
        expected: ENVIRONMENT_EXPECTED,
    })
}

fn secret_key_from_env<E: Env>(
    env: &E,
    environment: Environment,
) -> Result<String, AppConfigError> {
    let secret = required_from_env(env, SECRET_KEY_ENV)?;
    if environment.is_production() && secret == DEV_SECRET_PLACEHOLDER {
        return Err(AppConfigError::PlaceholderSecret);
    }
    Ok(secret)
}
