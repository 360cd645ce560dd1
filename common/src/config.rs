use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

/// Environment variable naming an alternative settings file.
pub const CONFIG_PATH_ENV: &str = "TPCDS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/tpcds";

/// Process-wide settings that tune the engine and the generator runner.
///
/// These never influence generation options; those come from the command line only.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_concurrent_generators")]
    pub max_concurrent_generators: usize,
    #[serde(default)]
    pub staging_dir: Option<String>,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            batch_size: default_batch_size(),
            max_concurrent_generators: default_max_concurrent_generators(),
            staging_dir: None,
            log_format: default_log_format(),
        }
    }
}

fn default_app_name() -> String {
    "TPCDS Data Generation".to_string()
}

fn default_batch_size() -> usize {
    8192
}

fn default_max_concurrent_generators() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Settings {
    /// Loads settings from `$TPCDS_CONFIG` (or `config/tpcds.toml`) when present,
    /// overlaid with `TPCDS_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_path(&path)
    }

    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("TPCDS").try_parsing(true));

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        if settings.max_concurrent_generators == 0 {
            return Err(ConfigError::Message(
                "max_concurrent_generators must be at least 1".to_string(),
            ));
        }

        debug!(?settings, config_path = path, "Loaded settings");

        Ok(settings)
    }
}
