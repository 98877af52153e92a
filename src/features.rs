use crate::errors::{AQCastError, FeatureValidationError, ScalingError};
use crate::scaling::Scaler;
use crate::time_series::{LookbackWindow, WINDOW_HOURS};

/// Weather features the model was trained on, in the column order the feature scaler was fitted with
pub const REQUIRED_FEATURES: [&str; 8] = [
    "temp",
    "dew",
    "humidity",
    "windspeed",
    "windgust",
    "winddir",
    "pressure",
    "solarenergy",
];

/// Scaled model input of logical shape (1, 24, F), stored row major
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    shape: [usize; 3],
    data: Vec<f64>,
}

impl FeatureTensor {
    /// Shapes a scaled 24 x F matrix into a (1, 24, F) tensor without touching element order
    ///
    /// # Arguments
    ///
    /// * 'rows' - scaled matrix, one row per hour
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<FeatureTensor, FeatureValidationError> {
        if rows.len() != WINDOW_HOURS {
            return Err(FeatureValidationError::ShapeMismatch { expected: WINDOW_HOURS, actual: rows.len() });
        }
        let columns = rows[0].len();
        if let Some(bad) = rows.iter().find(|r| r.len() != columns) {
            return Err(FeatureValidationError::ShapeMismatch { expected: columns, actual: bad.len() });
        }

        Ok(FeatureTensor {
            shape: [1, WINDOW_HOURS, columns],
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Flat row major view
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at (hour, feature) of the single window
    pub fn at(&self, hour: usize, feature: usize) -> f64 {
        self.data[hour * self.shape[2] + feature]
    }
}

/// Builds the raw 24 x F matrix, window order by required feature order
///
/// # Arguments
///
/// * 'window' - the lookback window
/// * 'features' - required feature names in fitted column order
pub fn feature_matrix(window: &LookbackWindow, features: &[&str]) -> Result<Vec<Vec<f64>>, FeatureValidationError> {
    window.observations()
        .iter()
        .map(|obs| {
            features.iter()
                .map(|name| {
                    obs.features.get(*name).copied().ok_or_else(|| FeatureValidationError::MissingFeature {
                        feature: name.to_string(),
                        timestamp: obs.timestamp,
                    })
                })
                .collect::<Result<Vec<f64>, FeatureValidationError>>()
        })
        .collect()
}

/// Selects, scales and shapes the window into the tensor the model expects
///
/// # Arguments
///
/// * 'window' - the lookback window
/// * 'features' - required feature names in fitted column order
/// * 'scaler' - feature scaler fitted with the same column order
pub fn project(window: &LookbackWindow, features: &[&str], scaler: &dyn Scaler) -> Result<FeatureTensor, AQCastError> {
    if scaler.columns() != features.len() {
        return Err(ScalingError(format!("feature scaler fitted with {} columns, {} features required",
                                        scaler.columns(), features.len())).into());
    }

    let matrix = feature_matrix(window, features)?;
    let scaled = scaler.transform(&matrix)?;

    Ok(FeatureTensor::from_rows(scaled)?)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use chrono::NaiveDate;
    use super::*;
    use crate::scaling::{ColumnScaler, ScalerParams};
    use crate::time_series::{align, DayBatch, HourRecord};

    fn window(skip_feature_at: Option<(u32, &str)>) -> LookbackWindow {
        let date = NaiveDate::from_ymd_opt(2024, 12, 13).unwrap();
        let hours = (0..24)
            .map(|h| {
                let mut features = REQUIRED_FEATURES.iter()
                    .enumerate()
                    .map(|(i, f)| (f.to_string(), h as f64 * 10.0 + i as f64))
                    .collect::<BTreeMap<String, f64>>();
                features.insert("cloudcover".to_string(), 55.0);
                if let Some((hour, name)) = skip_feature_at {
                    if hour == h {
                        features.remove(name);
                    }
                }
                HourRecord { time_of_day: format!("{:02}:00:00", h), features }
            })
            .collect();

        align(&[DayBatch { date, hours }], date, 23).unwrap()
    }

    #[test]
    fn matrix_follows_required_order_not_window_order() {
        let matrix = feature_matrix(&window(None), &REQUIRED_FEATURES).unwrap();

        assert_eq!(matrix.len(), 24);
        assert!(matrix.iter().all(|r| r.len() == 8));
        // BTreeMap iterates alphabetically, required order is positional
        assert_eq!(matrix[3], vec![30.0, 31.0, 32.0, 33.0, 34.0, 35.0, 36.0, 37.0]);
    }

    #[test]
    fn missing_feature_is_reported() {
        let result = project(&window(Some((7, "windgust"))), &REQUIRED_FEATURES, &ColumnScaler::identity(8));

        match result {
            Err(AQCastError::FeatureValidation(FeatureValidationError::MissingFeature { feature, timestamp })) => {
                assert_eq!(feature, "windgust");
                assert_eq!(timestamp.to_string(), "2024-12-13 07:00:00");
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn reshape_keeps_order_and_values() {
        let scaler = ColumnScaler::new(ScalerParams::MinMax { min: vec![1.0; 8], scale: vec![2.0; 8] }).unwrap();
        let tensor = project(&window(None), &REQUIRED_FEATURES, &scaler).unwrap();

        assert_eq!(tensor.shape(), [1, 24, 8]);
        assert_eq!(tensor.data().len(), 24 * 8);
        assert_eq!(tensor.at(0, 0), 1.0);
        assert_eq!(tensor.at(2, 5), (20.0 + 5.0) * 2.0 + 1.0);
        assert_eq!(tensor.data()[2 * 8 + 5], tensor.at(2, 5));
    }

    #[test]
    fn scaler_column_count_must_match() {
        let result = project(&window(None), &REQUIRED_FEATURES, &ColumnScaler::identity(6));
        assert!(matches!(result, Err(AQCastError::Scaling(_))));
    }
}
