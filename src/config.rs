use std::fs;
use std::path::Path;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::validation::{DEFAULT_PRECISION, MAX_PRECISION};

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Debug)]
pub struct Files {
    pub feature_scaler: String,
    pub target_scaler: String,
    pub model: String,
    pub weather: String,
    pub pollution: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ValidationParameters {
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default = "default_prefix")]
    pub metric_prefix: String,
}

impl Default for ValidationParameters {
    fn default() -> Self {
        ValidationParameters { precision: default_precision(), metric_prefix: default_prefix() }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub general: General,
    pub files: Files,
    #[serde(default)]
    pub validation: ValidationParameters,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

fn default_prefix() -> String {
    "aqcast".to_string()
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {

    let toml = fs::read_to_string(config_path)?;
    let mut config: Config = toml::from_str(&toml)?;
    config.validation.precision = config.validation.precision.min(MAX_PRECISION);

    for file in [&config.files.feature_scaler, &config.files.target_scaler, &config.files.model] {
        if !Path::new(file).exists() {
            return Err(ConfigError::Invalid(format!("resource file not found: {}", file)));
        }
    }

    Ok(config)
}
