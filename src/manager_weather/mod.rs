use std::fs;
use std::path::Path;
use chrono::NaiveDate;
use log::{debug, info};
use crate::errors::SourceError;
use crate::models::visual_crossing::Timeline;
use crate::time_series::DayBatch;

/// Timezone names accepted in weather documents, hours must line up with UTC pollution timestamps
const UTC_NAMES: [&str; 3] = ["Z", "UTC", "Etc/UTC"];

/// Struct for managing weather timeline documents saved by the weather collector
pub struct Weather {
    timeline: Timeline,
}

impl Weather {
    /// Loads a weather timeline document
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the JSON document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Weather, SourceError> {
        let json = fs::read_to_string(path.as_ref())?;
        let weather = Weather::from_json(&json)?;
        info!("loaded weather for {} days from {}", weather.timeline.days.len(), path.as_ref().display());

        Ok(weather)
    }

    /// Parses a weather timeline document, which must be expressed in UTC
    ///
    /// # Arguments
    ///
    /// * 'json' - the document
    pub fn from_json(json: &str) -> Result<Weather, SourceError> {
        let timeline: Timeline = serde_json::from_str(json)?;

        if let Some(tz) = &timeline.timezone {
            if !UTC_NAMES.contains(&tz.as_str()) {
                return Err(SourceError::Timezone(format!("weather document is in '{}', expected UTC", tz)));
            }
        }

        Ok(Weather { timeline })
    }

    /// Returns the day batches for all days between start and end, both inclusive
    ///
    /// # Arguments
    ///
    /// * 'start' - first date
    /// * 'end' - last date
    pub fn get_days(&self, start: NaiveDate, end: NaiveDate) -> Vec<DayBatch> {
        let batches = self.timeline.days.iter()
            .filter(|d| d.datetime >= start && d.datetime <= end)
            .map(DayBatch::from)
            .collect::<Vec<DayBatch>>();
        debug!("{} day batches between {} and {}", batches.len(), start, end);

        batches
    }
}
