use chrono::NaiveDateTime;
use thiserror::Error;
use crate::pollutants::PollutantCode;

/// Failures while building the timeline or cutting the lookback window
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("AlignmentError: target timestamp not found: {0}")]
    TargetNotFound(NaiveDateTime),
    #[error("AlignmentError: insufficient history: {available} hours before {target}, need {needed}")]
    InsufficientHistory { target: NaiveDateTime, available: usize, needed: usize },
    #[error("AlignmentError: window is not hourly contiguous between {0} and {1}")]
    NonContiguous(NaiveDateTime, NaiveDateTime),
    #[error("AlignmentError: duplicate timestamp in timeline: {0}")]
    DuplicateTimestamp(NaiveDateTime),
    #[error("AlignmentError: malformed time of day '{0}'")]
    MalformedTime(String),
}

/// Missing feature columns or pollutant codes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureValidationError {
    #[error("FeatureValidationError: missing feature '{feature}' at {timestamp}")]
    MissingFeature { feature: String, timestamp: NaiveDateTime },
    #[error("FeatureValidationError: missing pollutant '{0}'")]
    MissingPollutant(PollutantCode),
    #[error("FeatureValidationError: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("InferenceError: {0}")]
pub struct InferenceError(pub String);

#[derive(Error, Debug, Clone, PartialEq)]
#[error("ScalingError: {0}")]
pub struct ScalingError(pub String);

#[derive(Error, Debug, Clone, PartialEq)]
#[error("ValidationDataError: {0}")]
pub struct ValidationDataError(pub String);

/// Errors raised while loading configuration and process-wide resources
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ConfigError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ConfigError::Toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("ConfigError::Json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ConfigError::Logging: {0}")]
    Logging(String),
    #[error("ConfigError: {0}")]
    Invalid(String),
}
impl From<log::SetLoggerError> for ConfigError {
    fn from(e: log::SetLoggerError) -> Self {
        ConfigError::Logging(e.to_string())
    }
}
impl From<log4rs::config::runtime::ConfigErrors> for ConfigError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self {
        ConfigError::Logging(e.to_string())
    }
}
impl From<ScalingError> for ConfigError {
    fn from(e: ScalingError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}
impl From<InferenceError> for ConfigError {
    fn from(e: InferenceError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

/// Errors raised while reading weather or pollution documents
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("SourceError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("SourceError::Document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("SourceError::Date: {0}")]
    Date(#[from] chrono::ParseError),
    #[error("SourceError::Timezone: {0}")]
    Timezone(String),
}

/// Pipeline level error, one variant per failing stage
#[derive(Error, Debug)]
pub enum AQCastError {
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    FeatureValidation(#[from] FeatureValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Scaling(#[from] ScalingError),
    #[error(transparent)]
    ValidationData(#[from] ValidationDataError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl AQCastError {
    /// Returns a short message fit for an end user, distinct per error kind
    pub fn user_message(&self) -> &'static str {
        match self {
            AQCastError::Alignment(AlignmentError::InsufficientHistory { .. }) =>
                "Not enough historical weather data to build the past 24 hours.",
            AQCastError::Alignment(AlignmentError::TargetNotFound(_)) =>
                "The requested date and hour were not found in the weather data.",
            AQCastError::Alignment(_) =>
                "Error extracting the past 24 hours of weather data.",
            AQCastError::FeatureValidation(_) =>
                "Error preprocessing data: required weather features or pollutants are missing.",
            AQCastError::Inference(_) =>
                "Error during prediction.",
            AQCastError::Scaling(_) =>
                "Error processing prediction results.",
            AQCastError::ValidationData(_) =>
                "No observed pollution data is available for the requested hour.",
            AQCastError::Source(_) =>
                "Error reading weather or pollution data.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn user_messages_are_distinct_per_kind() {
        let ts = NaiveDate::from_ymd_opt(2024, 12, 13).unwrap().and_hms_opt(15, 0, 0).unwrap();
        let errors: Vec<AQCastError> = vec![
            AlignmentError::TargetNotFound(ts).into(),
            AlignmentError::InsufficientHistory { target: ts, available: 20, needed: 23 }.into(),
            FeatureValidationError::MissingPollutant(PollutantCode::Co).into(),
            InferenceError("boom".to_string()).into(),
            ScalingError("boom".to_string()).into(),
            ValidationDataError("miss".to_string()).into(),
        ];

        let mut messages = errors.iter().map(|e| e.user_message()).collect::<Vec<_>>();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn display_names_the_stage() {
        let ts = NaiveDate::from_ymd_opt(2024, 12, 13).unwrap().and_hms_opt(15, 0, 0).unwrap();
        let e: AQCastError = AlignmentError::TargetNotFound(ts).into();
        assert!(e.to_string().starts_with("AlignmentError: target timestamp not found"));

        let e: AQCastError = ValidationDataError("no observation".to_string()).into();
        assert_eq!(e.to_string(), "ValidationDataError: no observation");
    }
}
