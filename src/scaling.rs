use std::fs;
use std::path::Path;
use serde::Deserialize;
use crate::errors::{ConfigError, ScalingError};

/// Column-wise transform between a physical space and a model's normalized space.
///
/// Implementations hold parameters fitted elsewhere and are shared read-only between
/// requests, hence the `Send + Sync` bound.
pub trait Scaler: Send + Sync {
    /// Number of columns the parameters were fitted with
    fn columns(&self) -> usize;

    /// Maps physical rows into scaled space
    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ScalingError>;

    /// Maps scaled rows back into physical space
    fn inverse_transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ScalingError>;
}

/// Fitted scaler parameters as stored on disk
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// z = (x - mean) / scale
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// z = x * scale + min
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

/// Per column affine scaler covering both standard and min-max parameterizations.
///
/// Both are stored as `z = x * factor + offset` so transform and inverse share one code path.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScaler {
    factor: Vec<f64>,
    offset: Vec<f64>,
}

impl ColumnScaler {
    /// Creates a scaler from fitted parameters
    ///
    /// # Arguments
    ///
    /// * 'params' - the fitted parameters
    pub fn new(params: ScalerParams) -> Result<ColumnScaler, ScalingError> {
        let (factor, offset) = match params {
            ScalerParams::Standard { mean, scale } => {
                check_lengths(mean.len(), scale.len())?;
                check_scale(&scale)?;
                let factor = scale.iter().map(|s| 1.0 / s).collect::<Vec<f64>>();
                let offset = mean.iter().zip(&scale).map(|(m, s)| -m / s).collect::<Vec<f64>>();
                (factor, offset)
            },
            ScalerParams::MinMax { min, scale } => {
                check_lengths(min.len(), scale.len())?;
                check_scale(&scale)?;
                (scale, min)
            },
        };

        Ok(ColumnScaler { factor, offset })
    }

    /// Loads fitted parameters from a JSON file
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the parameter file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ColumnScaler, ConfigError> {
        let json = fs::read_to_string(path)?;
        let params: ScalerParams = serde_json::from_str(&json)?;

        Ok(ColumnScaler::new(params)?)
    }

    /// Identity scaler over the given number of columns
    ///
    /// # Arguments
    ///
    /// * 'columns' - number of columns
    pub fn identity(columns: usize) -> ColumnScaler {
        ColumnScaler { factor: vec![1.0; columns], offset: vec![0.0; columns] }
    }

    fn apply<F>(&self, rows: &[Vec<f64>], f: F) -> Result<Vec<Vec<f64>>, ScalingError>
    where F: Fn(f64, f64, f64) -> f64 {
        let mut result: Vec<Vec<f64>> = Vec::with_capacity(rows.len());

        for (r, row) in rows.iter().enumerate() {
            if row.len() != self.columns() {
                return Err(ScalingError(format!("row {} has {} columns, scaler fitted with {}",
                                                r, row.len(), self.columns())));
            }
            let scaled = row.iter()
                .zip(self.factor.iter().zip(&self.offset))
                .map(|(x, (factor, offset))| f(*x, *factor, *offset))
                .collect::<Vec<f64>>();

            if scaled.iter().any(|v| !v.is_finite()) {
                return Err(ScalingError(format!("non-finite value in row {}", r)));
            }
            result.push(scaled);
        }

        Ok(result)
    }
}

impl Scaler for ColumnScaler {
    fn columns(&self) -> usize {
        self.factor.len()
    }

    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ScalingError> {
        self.apply(rows, |x, factor, offset| x * factor + offset)
    }

    fn inverse_transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ScalingError> {
        self.apply(rows, |z, factor, offset| (z - offset) / factor)
    }
}

fn check_lengths(a: usize, b: usize) -> Result<(), ScalingError> {
    if a != b || a == 0 {
        Err(ScalingError(format!("parameter length mismatch: {} vs {}", a, b)))
    } else {
        Ok(())
    }
}

fn check_scale(scale: &[f64]) -> Result<(), ScalingError> {
    if let Some(i) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
        Err(ScalingError(format!("invalid scale in column {}", i)))
    } else {
        Ok(())
    }
}
