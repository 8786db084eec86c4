//! Layered runtime configuration.
//!
//! Resolution order (later wins): built-in defaults, `config/default.toml` if present,
//! then environment variables prefixed `SCHEDULER__` (double underscore separates nesting,
//! matching `config`'s `Environment::with_separator` convention).

use serde::Deserialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub firebase_project_id: String,
    pub firebase_credentials_path: String,

    pub num_vehicles: u32,
    pub tick_rate_seconds: f64,
    pub oven_production_rate: u32,
    pub max_conveyor_pick: u32,

    pub api_host: String,
    pub api_port: u16,
    pub allowed_origins: Vec<String>,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            firebase_project_id: String::new(),
            firebase_credentials_path: "serviceAccountKey.json".to_string(),
            num_vehicles: 900,
            tick_rate_seconds: 0.5,
            oven_production_rate: 1,
            max_conveyor_pick: 10,
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            debug: true,
        }
    }
}

impl Settings {
    /// Load settings from the layered sources described above.
    ///
    /// `firebase_project_id` has no built-in default; it must come from the environment or
    /// config file, otherwise this returns `ConfigMissing` so startup aborts before the tick
    /// loop is spawned (per the core's `ConfigMissing` error is fatal at startup).
    pub fn load() -> Result<Self, CoreError> {
        let defaults = Settings::default();

        let builder = config::Config::builder()
            .set_default("firebase_project_id", defaults.firebase_project_id)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("firebase_credentials_path", defaults.firebase_credentials_path)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("num_vehicles", defaults.num_vehicles)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("tick_rate_seconds", defaults.tick_rate_seconds)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("oven_production_rate", defaults.oven_production_rate)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("max_conveyor_pick", defaults.max_conveyor_pick)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("api_host", defaults.api_host)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("api_port", defaults.api_port)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("allowed_origins", defaults.allowed_origins)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .set_default("debug", defaults.debug)
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("SCHEDULER").separator("__"));

        let cfg = builder.build().map_err(|e| CoreError::ConfigMissing(e.to_string()))?;

        let settings: Settings = cfg
            .try_deserialize()
            .map_err(|e| CoreError::ConfigMissing(e.to_string()))?;

        if settings.firebase_project_id.is_empty() {
            return Err(CoreError::ConfigMissing("firebase_project_id".to_string()));
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_settings() {
        let d = Settings::default();
        assert_eq!(d.num_vehicles, 900);
        assert_eq!(d.tick_rate_seconds, 0.5);
        assert_eq!(d.oven_production_rate, 1);
        assert_eq!(d.max_conveyor_pick, 10);
        assert_eq!(d.api_port, 8000);
    }
}
