use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use log::{debug, info};
use serde::Deserialize;
use crate::errors::{ConfigError, InferenceError, ScalingError};
use crate::features::FeatureTensor;
use crate::pollutants::{Physical, PollutantVector, Scaled, POLLUTANT_COUNT};
use crate::scaling::Scaler;

/// A trained forecasting model taking a (1, 24, F) tensor to six scaled pollutant values
pub trait ForecastModel: Send {
    fn predict(&self, tensor: &FeatureTensor) -> Result<Vec<f64>, InferenceError>;
}

/// Single dense layer over the flattened input tensor
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DenseModel {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl DenseModel {
    /// Creates a dense model, one weight row per output
    ///
    /// # Arguments
    ///
    /// * 'weights' - output x input weight matrix
    /// * 'bias' - one bias per output
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<DenseModel, InferenceError> {
        if weights.len() != bias.len() {
            return Err(InferenceError(format!("{} weight rows but {} biases", weights.len(), bias.len())));
        }
        if let Some(first) = weights.first() {
            if weights.iter().any(|w| w.len() != first.len()) {
                return Err(InferenceError("ragged weight matrix".to_string()));
            }
        }

        Ok(DenseModel { weights, bias })
    }

    /// Loads model weights from a JSON file
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the weights file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DenseModel, ConfigError> {
        let json = fs::read_to_string(path)?;
        let model: DenseModel = serde_json::from_str(&json)?;

        Ok(DenseModel::new(model.weights, model.bias)?)
    }

    fn inputs(&self) -> usize {
        self.weights.first().map_or(0, |w| w.len())
    }
}

impl ForecastModel for DenseModel {
    fn predict(&self, tensor: &FeatureTensor) -> Result<Vec<f64>, InferenceError> {
        let input = tensor.data();
        if input.len() != self.inputs() {
            return Err(InferenceError(format!("model expects {} inputs, tensor {:?} has {}",
                                              self.inputs(), tensor.shape(), input.len())));
        }

        Ok(self.weights.iter()
            .zip(&self.bias)
            .map(|(w, b)| w.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect())
    }
}

/// Runs the shared model, one invocation at a time
#[derive(Clone)]
pub struct ForecastInvoker {
    model: Arc<Mutex<Box<dyn ForecastModel>>>,
}

impl ForecastInvoker {
    /// Wraps a model for serialized access
    ///
    /// # Arguments
    ///
    /// * 'model' - the forecasting model
    pub fn new(model: Box<dyn ForecastModel>) -> ForecastInvoker {
        ForecastInvoker { model: Arc::new(Mutex::new(model)) }
    }

    /// Passes the tensor to the model and returns its scaled output in target order
    ///
    /// # Arguments
    ///
    /// * 'tensor' - the scaled model input
    pub fn invoke(&self, tensor: &FeatureTensor) -> Result<PollutantVector<Scaled>, InferenceError> {
        let output = {
            let model = self.model.lock()
                .map_err(|e| InferenceError(format!("model lock poisoned: {}", e)))?;
            model.predict(tensor)?
        };

        if output.len() != POLLUTANT_COUNT {
            return Err(InferenceError(format!("model returned {} values, expected {}", output.len(), POLLUTANT_COUNT)));
        }
        if output.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError(format!("model returned non-finite output {:?}", output)));
        }
        debug!("scaled prediction {:?}", output);

        PollutantVector::from_slice(&output).map_err(|e| InferenceError(e.to_string()))
    }
}

/// Turns scaled pollutant vectors into physical units using the target scaler
pub struct TargetDescaler<'a> {
    scaler: &'a dyn Scaler,
}

impl<'a> TargetDescaler<'a> {
    pub fn new(scaler: &'a dyn Scaler) -> TargetDescaler<'a> {
        TargetDescaler { scaler }
    }

    /// Inverse scales a single vector
    ///
    /// # Arguments
    ///
    /// * 'scaled' - vector in model space
    pub fn descale(&self, scaled: &PollutantVector<Scaled>) -> Result<PollutantVector<Physical>, ScalingError> {
        let mut batch = self.descale_batch(std::slice::from_ref(scaled))?;
        batch.pop().ok_or_else(|| ScalingError("inverse transform returned no rows".to_string()))
    }

    /// Inverse scales a batch of vectors, order preserved
    ///
    /// # Arguments
    ///
    /// * 'batch' - vectors in model space
    pub fn descale_batch(&self, batch: &[PollutantVector<Scaled>]) -> Result<Vec<PollutantVector<Physical>>, ScalingError> {
        let rows = batch.iter().map(|v| v.values().to_vec()).collect::<Vec<Vec<f64>>>();
        let physical = self.scaler.inverse_transform(&rows)?;

        if physical.len() != batch.len() {
            return Err(ScalingError(format!("inverse transform returned {} rows for {}", physical.len(), batch.len())));
        }

        let result = physical.iter()
            .map(|row| PollutantVector::from_slice(row).map_err(|e| ScalingError(e.to_string())))
            .collect::<Result<Vec<PollutantVector<Physical>>, ScalingError>>()?;
        info!("descaled {} prediction(s)", result.len());

        Ok(result)
    }

    /// Scales a physical vector into model space, used for observed values during validation
    ///
    /// # Arguments
    ///
    /// * 'physical' - vector in real units
    pub fn rescale(&self, physical: &PollutantVector<Physical>) -> Result<PollutantVector<Scaled>, ScalingError> {
        let scaled = self.scaler.transform(&[physical.values().to_vec()])?;
        let row = scaled.first().ok_or_else(|| ScalingError("transform returned no rows".to_string()))?;

        PollutantVector::from_slice(row).map_err(|e| ScalingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::pollutants::PollutantCode;
    use crate::scaling::{ColumnScaler, ScalerParams};

    struct FailingModel;

    impl ForecastModel for FailingModel {
        fn predict(&self, _: &FeatureTensor) -> Result<Vec<f64>, InferenceError> {
            Err(InferenceError("runtime unavailable".to_string()))
        }
    }

    struct ShortModel;

    impl ForecastModel for ShortModel {
        fn predict(&self, _: &FeatureTensor) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![0.1, 0.2])
        }
    }

    fn tensor(value: f64) -> FeatureTensor {
        FeatureTensor::from_rows(vec![vec![value; 8]; 24]).unwrap()
    }

    #[test]
    fn dense_model_weighted_sum() {
        let mut weights = vec![vec![0.0; 192]; 6];
        weights[0][0] = 2.0;
        weights[5] = vec![1.0; 192];
        let model = DenseModel::new(weights, vec![0.5, 0.0, 0.0, 0.0, 0.0, -1.0]).unwrap();

        let output = ForecastInvoker::new(Box::new(model)).invoke(&tensor(0.5)).unwrap();
        assert_relative_eq!(output.get(PollutantCode::So2), 1.5, epsilon = 1e-12);
        assert_relative_eq!(output.get(PollutantCode::No2), 0.0, epsilon = 1e-12);
        assert_relative_eq!(output.get(PollutantCode::Co), 95.0, epsilon = 1e-9);
    }

    #[test]
    fn dense_model_rejects_wrong_input_size() {
        let model = DenseModel::new(vec![vec![1.0; 10]; 6], vec![0.0; 6]).unwrap();
        let result = model.predict(&tensor(1.0));
        assert!(matches!(result, Err(InferenceError(_))));
    }

    #[test]
    fn model_failure_surfaces_as_inference_error() {
        let result = ForecastInvoker::new(Box::new(FailingModel)).invoke(&tensor(0.0));
        assert_eq!(result, Err(InferenceError("runtime unavailable".to_string())));
    }

    #[test]
    fn wrong_output_length_is_not_padded() {
        let result = ForecastInvoker::new(Box::new(ShortModel)).invoke(&tensor(0.0));
        assert_eq!(result, Err(InferenceError("model returned 2 values, expected 6".to_string())));
    }

    #[test]
    fn descale_batch_preserves_order() {
        let scaler = ColumnScaler::new(ScalerParams::Standard {
            mean: vec![10.0, 20.0, 30.0, 40.0, 50.0, 4000.0],
            scale: vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
        }).unwrap();
        let descaler = TargetDescaler::new(&scaler);

        let batch = vec![
            PollutantVector::<Scaled>::new([0.0; 6]),
            PollutantVector::<Scaled>::new([1.0; 6]),
        ];
        let physical = descaler.descale_batch(&batch).unwrap();

        let expected = [[10.0, 20.0, 30.0, 40.0, 50.0, 4000.0], [11.0, 22.0, 33.0, 44.0, 55.0, 4100.0]];
        for (row, expected) in physical.iter().zip(expected) {
            for (value, e) in row.values().iter().zip(expected) {
                assert_relative_eq!(*value, e, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn descale_then_rescale_adds_no_drift() {
        let scaler = ColumnScaler::new(ScalerParams::MinMax {
            min: vec![-0.1, 0.0, 0.2, 0.0, -0.5, 0.0],
            scale: vec![0.01, 0.02, 0.005, 0.1, 0.004, 0.0001],
        }).unwrap();
        let descaler = TargetDescaler::new(&scaler);

        let scaled = PollutantVector::<Scaled>::new([0.3, 0.7, 0.1, 0.9, 0.5, 0.42]);
        let back = descaler.rescale(&descaler.descale(&scaled).unwrap()).unwrap();
        for (a, b) in scaled.values().iter().zip(back.values()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn descaler_with_wrong_width_fails() {
        let scaler = ColumnScaler::identity(5);
        let result = TargetDescaler::new(&scaler).descale(&PollutantVector::new([0.0; 6]));
        assert!(matches!(result, Err(ScalingError(_))));
    }
}
