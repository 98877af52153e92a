use std::sync::Arc;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use crate::aqi::{classify, AqiReport, AqiTier};
use crate::errors::AQCastError;
use crate::features::{project, REQUIRED_FEATURES};
use crate::forecast::{ForecastInvoker, TargetDescaler};
use crate::manager_pollution::Pollution;
use crate::metrics::MetricsSink;
use crate::pollutants::{Physical, PollutantVector, Scaled};
use crate::scaling::Scaler;
use crate::time_series::{align, DayBatch};
use crate::validation::{round_to, ValidationEngine, ValidationResult, DEFAULT_PRECISION};

/// Decimals physical concentrations are rounded to before classification
pub const REPORT_DECIMALS: u32 = 2;

/// Settings for the pipeline that are not resources
#[derive(Debug, Clone)]
pub struct Settings {
    pub precision: u32,
    pub metric_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { precision: DEFAULT_PRECISION, metric_prefix: "aqcast".to_string() }
    }
}

/// Outcome of one forecast
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub timestamp: NaiveDateTime,
    pub scaled: PollutantVector<Scaled>,
    pub pollutants: PollutantVector<Physical>,
    pub aqi: AqiReport,
}

impl Forecast {
    pub fn tier(&self) -> AqiTier {
        self.aqi.overall
    }
}

/// Forecast and validation pipeline with its shared read-only resources injected
pub struct Pipeline {
    feature_scaler: Arc<dyn Scaler>,
    target_scaler: Arc<dyn Scaler>,
    invoker: ForecastInvoker,
    metrics: Arc<dyn MetricsSink>,
    settings: Settings,
}

impl Pipeline {
    /// Creates a new pipeline
    ///
    /// # Arguments
    ///
    /// * 'feature_scaler' - scaler fitted on the required weather features
    /// * 'target_scaler' - scaler fitted on the six pollutant targets
    /// * 'invoker' - invoker around the forecasting model
    /// * 'metrics' - telemetry sink
    /// * 'settings' - reporting settings
    pub fn new(feature_scaler: Arc<dyn Scaler>,
               target_scaler: Arc<dyn Scaler>,
               invoker: ForecastInvoker,
               metrics: Arc<dyn MetricsSink>,
               settings: Settings) -> Pipeline {
        Pipeline { feature_scaler, target_scaler, invoker, metrics, settings }
    }

    /// Forecasts pollutant concentrations and the AQI tier for the given hour
    ///
    /// # Arguments
    ///
    /// * 'batches' - weather day batches covering the 24 hours up to the target
    /// * 'date' - target date
    /// * 'hour' - target hour, 0-23
    pub fn forecast(&self, batches: &[DayBatch], date: NaiveDate, hour: u32) -> Result<Forecast, AQCastError> {
        let window = align(batches, date, hour)
            .inspect_err(|e| warn!("{}", e))?;
        for obs in window.observations() {
            debug!("{} {:?}", obs.timestamp, obs.features);
        }
        let tensor = project(&window, &REQUIRED_FEATURES, self.feature_scaler.as_ref())
            .inspect_err(|e| warn!("{}", e))?;
        let scaled = self.invoker.invoke(&tensor)?;
        let physical = TargetDescaler::new(self.target_scaler.as_ref()).descale(&scaled)?;
        let pollutants = PollutantVector::<Physical>::new(physical.values().map(|v| round_to(v, REPORT_DECIMALS)));
        let aqi = classify(&pollutants);

        self.metrics.increment_counter(&format!("{}_forecasts_total", self.settings.metric_prefix), 1);
        self.metrics.increment_counter(&format!("{}_aqi_{}_total", self.settings.metric_prefix, aqi.overall.slug()), 1);
        info!("forecast for {}: {}", window.target(), aqi.overall);

        Ok(Forecast { timestamp: window.target(), scaled, pollutants, aqi })
    }

    /// Validates a forecast against the observed pollutants at the same hour
    ///
    /// # Arguments
    ///
    /// * 'forecast' - a forecast from this pipeline
    /// * 'pollution' - source of observed pollutants
    pub fn validate(&self, forecast: &Forecast, pollution: &Pollution) -> Result<ValidationResult, AQCastError> {
        let observed = pollution.lookup(forecast.timestamp)?;
        self.validate_observed(forecast, &observed)
    }

    /// Validates a forecast against an already looked up observation in physical units
    ///
    /// # Arguments
    ///
    /// * 'forecast' - a forecast from this pipeline
    /// * 'observed' - observed pollutants in µg/m³
    pub fn validate_observed(&self, forecast: &Forecast, observed: &PollutantVector<Physical>) -> Result<ValidationResult, AQCastError> {
        let descaler = TargetDescaler::new(self.target_scaler.as_ref());
        let actual = descaler.rescale(observed)?;

        let engine = ValidationEngine::new(self.metrics.as_ref(), self.settings.precision, &self.settings.metric_prefix);

        Ok(engine.validate(forecast.timestamp, &forecast.scaled, &actual, &descaler)?)
    }
}
