use chrono::NaiveDateTime;
use log::info;
use crate::errors::ScalingError;
use crate::forecast::TargetDescaler;
use crate::metrics::MetricsSink;
use crate::pollutants::{Physical, PollutantCode, PollutantVector, Scaled, POLLUTANT_COUNT};

/// Decimal places used when reporting squared errors
pub const DEFAULT_PRECISION: u32 = 3;

/// Largest precision honored by rounding, larger values are capped
pub const MAX_PRECISION: u32 = 12;

/// Per pollutant squared error of one prediction against the observed values
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub timestamp: NaiveDateTime,
    pub squared_errors: [f64; POLLUTANT_COUNT],
    pub predicted: PollutantVector<Physical>,
    pub actual: PollutantVector<Physical>,
}

impl ValidationResult {
    pub fn squared_error(&self, code: PollutantCode) -> f64 {
        self.squared_errors[code.index()]
    }
}

/// Compares scaled predictions with scaled observations and reports the error to a metrics sink
pub struct ValidationEngine<'a> {
    metrics: &'a dyn MetricsSink,
    precision: u32,
    prefix: &'a str,
}

impl<'a> ValidationEngine<'a> {
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * 'metrics' - sink receiving one gauge and one histogram update per pollutant
    /// * 'precision' - decimal places to round squared errors to
    /// * 'prefix' - prefix for all metric names
    pub fn new(metrics: &'a dyn MetricsSink, precision: u32, prefix: &'a str) -> ValidationEngine<'a> {
        ValidationEngine { metrics, precision, prefix }
    }

    /// Computes the rounded squared error per pollutant, emits it and returns it together with
    /// the physical values it was computed from.
    ///
    /// Nothing is emitted unless every step succeeds.
    ///
    /// # Arguments
    ///
    /// * 'timestamp' - the hour the prediction is for
    /// * 'predicted' - model output in scaled space
    /// * 'actual' - observed values in scaled space
    /// * 'descaler' - target scaler used to report physical values
    pub fn validate(&self,
                    timestamp: NaiveDateTime,
                    predicted: &PollutantVector<Scaled>,
                    actual: &PollutantVector<Scaled>,
                    descaler: &TargetDescaler) -> Result<ValidationResult, ScalingError> {

        let mut physical = descaler.descale_batch(&[*predicted, *actual])?;
        let (actual_physical, predicted_physical) = match (physical.pop(), physical.pop()) {
            (Some(a), Some(p)) => (a, p),
            _ => return Err(ScalingError("inverse transform dropped rows".to_string())),
        };

        let mut squared_errors = [0.0; POLLUTANT_COUNT];
        for code in PollutantCode::ALL {
            let error = squared_error(predicted.get(code), actual.get(code));
            squared_errors[code.index()] = round_to(error, self.precision);
        }

        for code in PollutantCode::ALL {
            let value = squared_errors[code.index()];
            self.metrics.set_gauge(&format!("{}_mse_{}", self.prefix, code), value);
            self.metrics.observe_histogram(&format!("{}_squared_error", self.prefix), value);
        }
        self.metrics.increment_counter(&format!("{}_validations_total", self.prefix), 1);
        info!("validated prediction for {}: {:?}", timestamp, squared_errors);

        Ok(ValidationResult {
            timestamp,
            squared_errors,
            predicted: predicted_physical,
            actual: actual_physical,
        })
    }
}

/// Squared error of one prediction, i.e. the mean squared error of a single sample
///
/// # Arguments
///
/// * 'predicted' - predicted value
/// * 'actual' - observed value
pub fn squared_error(predicted: f64, actual: f64) -> f64 {
    let diff = predicted - actual;
    diff * diff
}

/// Rounds to the given number of decimals, ties go to the even neighbour.
///
/// Precision is capped at `MAX_PRECISION`.
///
/// # Arguments
///
/// * 'value' - value to round
/// * 'precision' - number of decimals
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    (value * factor).round_ties_even() / factor
}
