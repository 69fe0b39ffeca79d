//! Process configuration assembled from the environment at startup.

use tm_shared::config::{AuthConfig, DatabaseConfig, Environment, ServerConfig};

/// Complete API process configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// Called once in `main`; the result is injected into the services
    /// and never mutated afterwards.
    pub fn from_env() -> Self {
        Config {
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            server: ServerConfig::from_env(),
            environment: Environment::from_env(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}
