use std::collections::HashMap;
use std::fs;
use std::path::Path;
use chrono::NaiveDateTime;
use log::{info, warn};
use crate::errors::{SourceError, ValidationDataError};
use crate::models::open_weather::PollutionHistory;
use crate::pollutants::{Physical, PollutantVector};

/// Struct for managing observed pollution documents saved by the air quality collector
pub struct Pollution {
    observations: HashMap<i64, PollutantVector<Physical>>,
}

impl Pollution {
    /// Loads a pollution history document
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the JSON document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Pollution, SourceError> {
        let json = fs::read_to_string(path.as_ref())?;
        let pollution = Pollution::from_json(&json)?;
        info!("loaded {} pollution observations from {}", pollution.observations.len(), path.as_ref().display());

        Ok(pollution)
    }

    /// Parses a pollution history document
    ///
    /// # Arguments
    ///
    /// * 'json' - the document
    pub fn from_json(json: &str) -> Result<Pollution, SourceError> {
        let history: PollutionHistory = serde_json::from_str(json)?;
        let observations = history.list.iter()
            .map(|e| (e.dt, PollutantVector::new(e.components.targets())))
            .collect();

        Ok(Pollution { observations })
    }

    /// Returns the observed pollutants at exactly the given hour, timestamps are taken as UTC
    ///
    /// # Arguments
    ///
    /// * 'timestamp' - the hour to look up
    pub fn lookup(&self, timestamp: NaiveDateTime) -> Result<PollutantVector<Physical>, ValidationDataError> {
        let unix = timestamp.and_utc().timestamp();
        self.observations.get(&unix)
            .copied()
            .ok_or_else(|| {
                warn!("no pollution observation at {} ({})", timestamp, unix);
                ValidationDataError(format!("no observation at {}", timestamp))
            })
    }
}
