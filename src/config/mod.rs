// Configuration management module
// TOML settings for the embedding service and the retrieval layer

pub mod display;
pub mod settings;


pub use display::show_config;
pub use settings::{API_KEY_ENV_VAR, Config, ConfigError, OpenAiConfig, SearchConfig};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
