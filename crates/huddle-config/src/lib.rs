//! # huddle-config
//!
//! Layered configuration loading for Huddle using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`HUDDLE_*` prefix, `__` as separator)
//! 2. Project-level `.huddle/config.toml` (or `<config-dir>/config.toml`)
//! 3. User-level `~/.config/huddle/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `HUDDLE_SERVER__BIND` -> `server.bind`,
//! `HUDDLE_DATABASE__PATH` -> `database.path`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use huddle_config::HuddleConfig;
//!
//! let config = HuddleConfig::load_with_dotenv(None).expect("config");
//! println!("listening on {}", config.server.bind);
//! ```

mod database;
mod error;
mod general;
mod server;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::{GeneralConfig, PAGE_SIZE_CEILING};
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PROJECT_CONFIG_DIR: &str = ".huddle";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HuddleConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl HuddleConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// `config_dir` replaces the project-local `.huddle/` directory when given.
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load(config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(config_dir).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv(config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config_dir)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment(config_dir: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = config_dir
            .map_or_else(|| PathBuf::from(PROJECT_CONFIG_DIR), Path::to_path_buf)
            .join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("HUDDLE_").split("__"))
    }

    /// Reject values that would make list endpoints misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let general = &self.general;
        if general.max_page_size == 0 || general.max_page_size > PAGE_SIZE_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "general.max_page_size".into(),
                reason: format!("must be between 1 and {PAGE_SIZE_CEILING}"),
            });
        }
        if general.default_page_size == 0 || general.default_page_size > general.max_page_size {
            return Err(ConfigError::InvalidValue {
                field: "general.default_page_size".into(),
                reason: format!("must be between 1 and {}", general.max_page_size),
            });
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "server".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("huddle").join("config.toml"))
    }
}
