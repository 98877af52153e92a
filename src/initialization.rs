use std::sync::Arc;
use log::info;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{load_config, General};
use crate::errors::ConfigError;
use crate::forecast::{DenseModel, ForecastInvoker};
use crate::manager_weather::Weather;
use crate::manager_pollution::Pollution;
use crate::metrics::LogMetrics;
use crate::pipeline::{Pipeline, Settings};
use crate::scaling::ColumnScaler;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Process wide managers, loaded once
pub struct Mgr {
    pub pipeline: Pipeline,
    pub weather: Weather,
    pub pollution: Option<Pollution>,
}

/// Loads configuration, sets up logging and loads scalers, model and source documents
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn init(config_path: &str) -> Result<Mgr, ConfigError> {
    let config = load_config(config_path)?;
    setup_logger(&config.general)?;

    info!("aqcast version: {}", env!("CARGO_PKG_VERSION"));

    let feature_scaler = ColumnScaler::from_file(&config.files.feature_scaler)?;
    let target_scaler = ColumnScaler::from_file(&config.files.target_scaler)?;
    let model = DenseModel::from_file(&config.files.model)?;
    info!("scalers and model loaded");

    let weather = Weather::load(&config.files.weather)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let pollution = match &config.files.pollution {
        Some(path) => Some(Pollution::load(path).map_err(|e| ConfigError::Invalid(e.to_string()))?),
        None => None,
    };

    let settings = Settings {
        precision: config.validation.precision,
        metric_prefix: config.validation.metric_prefix,
    };

    let pipeline = Pipeline::new(
        Arc::new(feature_scaler),
        Arc::new(target_scaler),
        ForecastInvoker::new(Box::new(model)),
        Arc::new(LogMetrics),
        settings,
    );

    Ok(Mgr { pipeline, weather, pollution })
}

/// Sets up log4rs with a file appender and optionally a console appender
///
/// # Arguments
///
/// * 'general' - general configuration holding log path and level
fn setup_logger(general: &General) -> Result<(), ConfigError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)?;

    let mut builder = log4rs::Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let log_config = builder.build(root.build(general.log_level))?;
    log4rs::init_config(log_config)?;

    Ok(())
}
