//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! plus `STATIONLOCK__`-prefixed environment variables via the `config`
//! crate. The merged value is built once at startup and handed to the
//! engine; nothing below the CLI reads the environment again.

pub mod identity;
pub mod liveness;
pub mod logging;
pub mod paths;

use serde::{Deserialize, Serialize};

use self::identity::IdentityConfig;
use self::liveness::LivenessConfig;
use self::logging::LoggingConfig;
use self::paths::PathsConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Filesystem locations of every artifact the engine touches.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Lock enumeration settings.
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// Process liveness and termination settings.
    #[serde(default)]
    pub liveness: LivenessConfig,
    /// External identity codec settings.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Lock enumeration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Longest filename still accepted as a station ID by the shape filter.
    #[serde(default = "default_max_station_id_len")]
    pub max_station_id_len: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_station_id_len: default_max_station_id_len(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; every field has a default. Environment
    /// variables use the `STATIONLOCK` prefix and `__` as the section
    /// separator, e.g. `STATIONLOCK__PATHS__LOCK_DIR`.
    pub fn load(config_path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STATIONLOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.paths.lock_dir.as_os_str().is_empty() {
            return Err(AppError::configuration("paths.lock_dir must not be empty"));
        }
        if self.paths.ledger_dir.as_os_str().is_empty() {
            return Err(AppError::configuration(
                "paths.ledger_dir must not be empty",
            ));
        }
        if self.inventory.max_station_id_len == 0 {
            return Err(AppError::configuration(
                "inventory.max_station_id_len must be at least 1",
            ));
        }
        if self.paths.lock_dir == self.paths.ledger_dir {
            return Err(AppError::configuration(
                "paths.lock_dir and paths.ledger_dir must differ",
            ));
        }
        Ok(())
    }
}

fn default_max_station_id_len() -> usize {
    5
}
