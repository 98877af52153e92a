use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use crate::errors::FeatureValidationError;

/// Number of forecast targets
pub const POLLUTANT_COUNT: usize = 6;

/// Pollutant codes in the fixed order the forecasting model emits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PollutantCode {
    So2,
    No2,
    Pm10,
    Pm2_5,
    O3,
    Co,
}

impl PollutantCode {
    pub const ALL: [PollutantCode; POLLUTANT_COUNT] = [
        PollutantCode::So2,
        PollutantCode::No2,
        PollutantCode::Pm10,
        PollutantCode::Pm2_5,
        PollutantCode::O3,
        PollutantCode::Co,
    ];

    /// Short code as used in source documents and metric names
    pub fn code(&self) -> &'static str {
        match self {
            PollutantCode::So2   => "so2",
            PollutantCode::No2   => "no2",
            PollutantCode::Pm10  => "pm10",
            PollutantCode::Pm2_5 => "pm2_5",
            PollutantCode::O3    => "o3",
            PollutantCode::Co    => "co",
        }
    }

    /// Position of the pollutant in model output order
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PollutantCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Marker for vectors living in the model's normalized target space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scaled {}

/// Marker for vectors in real measurement units (µg/m³)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Physical {}

/// Six pollutant concentrations in fixed target order.
///
/// The type parameter records which space the values live in so that a scaled
/// model output can never be classified by mistake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollutantVector<S> {
    values: [f64; POLLUTANT_COUNT],
    space: PhantomData<S>,
}

impl<S> PollutantVector<S> {
    pub fn new(values: [f64; POLLUTANT_COUNT]) -> Self {
        Self { values, space: PhantomData }
    }

    /// Builds a vector from a slice in target order
    ///
    /// # Arguments
    ///
    /// * 'values' - exactly six values ordered so2, no2, pm10, pm2_5, o3, co
    pub fn from_slice(values: &[f64]) -> Result<Self, FeatureValidationError> {
        let values: [f64; POLLUTANT_COUNT] = values.try_into()
            .map_err(|_| FeatureValidationError::ShapeMismatch { expected: POLLUTANT_COUNT, actual: values.len() })?;

        Ok(Self::new(values))
    }

    /// Builds a vector from a code keyed map, all six codes must be present
    ///
    /// # Arguments
    ///
    /// * 'map' - pollutant code to concentration
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, FeatureValidationError> {
        let mut values = [0.0; POLLUTANT_COUNT];
        for code in PollutantCode::ALL {
            values[code.index()] = *map.get(code.code())
                .ok_or(FeatureValidationError::MissingPollutant(code))?;
        }

        Ok(Self::new(values))
    }

    pub fn get(&self, code: PollutantCode) -> f64 {
        self.values[code.index()]
    }

    pub fn values(&self) -> &[f64; POLLUTANT_COUNT] {
        &self.values
    }

    /// Iterates (code, value) pairs in target order
    pub fn iter(&self) -> impl Iterator<Item = (PollutantCode, f64)> + '_ {
        PollutantCode::ALL.iter().map(|c| (*c, self.values[c.index()]))
    }
}
