use std::collections::BTreeMap;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::debug;
use crate::errors::AlignmentError;

/// Number of hourly observations the forecasting model looks back over
pub const WINDOW_HOURS: usize = 24;

/// One hourly record as delivered by the weather source, time of day not yet combined with its date
#[derive(Debug, Clone, PartialEq)]
pub struct HourRecord {
    pub time_of_day: String,
    pub features: BTreeMap<String, f64>,
}

/// All hourly records for one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct DayBatch {
    pub date: NaiveDate,
    pub hours: Vec<HourRecord>,
}

/// A weather observation at a whole hour
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyObservation {
    pub timestamp: NaiveDateTime,
    pub features: BTreeMap<String, f64>,
}

/// Observations from all batches merged into one ascending sequence with unique timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    observations: Vec<HourlyObservation>,
}

impl Timeline {
    /// Flattens day batches into a single timeline sorted ascending by timestamp.
    ///
    /// Overlapping batches may deliver the same hour twice; identical copies are collapsed
    /// while conflicting copies are rejected.
    ///
    /// # Arguments
    ///
    /// * 'batches' - raw day batches in any order
    pub fn from_batches(batches: &[DayBatch]) -> Result<Timeline, AlignmentError> {
        let mut observations: Vec<HourlyObservation> = Vec::new();

        for batch in batches {
            for hour in &batch.hours {
                let time = parse_time_of_day(&hour.time_of_day)?;
                observations.push(HourlyObservation {
                    timestamp: batch.date.and_time(time),
                    features: hour.features.clone(),
                });
            }
        }

        observations.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let mut merged: Vec<HourlyObservation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match merged.last() {
                Some(last) if last.timestamp == obs.timestamp => {
                    if last.features != obs.features {
                        return Err(AlignmentError::DuplicateTimestamp(obs.timestamp));
                    }
                }
                _ => merged.push(obs),
            }
        }

        Ok(Timeline { observations: merged })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[HourlyObservation] {
        &self.observations
    }

    /// Returns the 24 consecutive observations ending at and including the target timestamp
    ///
    /// # Arguments
    ///
    /// * 'target' - timestamp of the last observation in the window
    pub fn window_at(&self, target: NaiveDateTime) -> Result<LookbackWindow, AlignmentError> {
        let index = self.observations
            .binary_search_by(|o| o.timestamp.cmp(&target))
            .map_err(|_| AlignmentError::TargetNotFound(target))?;

        if index < WINDOW_HOURS - 1 {
            return Err(AlignmentError::InsufficientHistory {
                target,
                available: index,
                needed: WINDOW_HOURS - 1,
            });
        }

        let slice = &self.observations[index + 1 - WINDOW_HOURS..=index];
        for pair in slice.windows(2) {
            if pair[1].timestamp - pair[0].timestamp != TimeDelta::hours(1) {
                return Err(AlignmentError::NonContiguous(pair[0].timestamp, pair[1].timestamp));
            }
        }

        debug!("lookback window {} -> {}", slice[0].timestamp, target);

        Ok(LookbackWindow { observations: slice.to_vec() })
    }
}

/// Exactly 24 hourly observations, one hour apart, ending at the target timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct LookbackWindow {
    observations: Vec<HourlyObservation>,
}

impl LookbackWindow {
    pub fn observations(&self) -> &[HourlyObservation] {
        &self.observations
    }

    /// Timestamp of the last (target) observation
    pub fn target(&self) -> NaiveDateTime {
        self.observations[WINDOW_HOURS - 1].timestamp
    }

    /// Timestamp of the first (oldest) observation
    pub fn start(&self) -> NaiveDateTime {
        self.observations[0].timestamp
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Merges the batches and cuts the lookback window for the given date and hour
///
/// # Arguments
///
/// * 'batches' - raw day batches from the weather source
/// * 'target_date' - date of the hour to forecast for
/// * 'target_hour' - hour of day, 0-23
pub fn align(batches: &[DayBatch], target_date: NaiveDate, target_hour: u32) -> Result<LookbackWindow, AlignmentError> {
    let timeline = Timeline::from_batches(batches)?;
    let target = target_timestamp(target_date, target_hour)?;

    timeline.window_at(target)
}

/// Combines a date and an hour into a whole hour timestamp
///
/// # Arguments
///
/// * 'date' - the date
/// * 'hour' - hour of day, 0-23
pub fn target_timestamp(date: NaiveDate, hour: u32) -> Result<NaiveDateTime, AlignmentError> {
    date.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| AlignmentError::MalformedTime(format!("{} hour {}", date, hour)))
}

/// Parses a time of day given as HH:MM:SS or HH:MM
///
/// # Arguments
///
/// * 'value' - the time of day string
fn parse_time_of_day(value: &str) -> Result<NaiveTime, AlignmentError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| AlignmentError::MalformedTime(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: NaiveDate, hours: std::ops::Range<u32>) -> DayBatch {
        DayBatch {
            date,
            hours: hours
                .map(|h| HourRecord {
                    time_of_day: format!("{:02}:00:00", h),
                    features: BTreeMap::from([("temp".to_string(), h as f64)]),
                })
                .collect(),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
    }

    #[test]
    fn window_has_24_hourly_steps_ending_at_target() {
        let batches = vec![day(date(13), 0..24), day(date(12), 0..24)];

        for hour in 0..24 {
            let window = align(&batches, date(13), hour).unwrap();
            assert_eq!(window.len(), WINDOW_HOURS);
            assert_eq!(window.target(), date(13).and_hms_opt(hour, 0, 0).unwrap());
            assert_eq!(window.target() - window.start(), TimeDelta::hours(23));
            for pair in window.observations().windows(2) {
                assert_eq!(pair[1].timestamp - pair[0].timestamp, TimeDelta::hours(1));
            }
        }
    }

    #[test]
    fn batches_are_sorted_before_windowing() {
        let batches = vec![day(date(13), 0..24), day(date(12), 0..24)];
        let timeline = Timeline::from_batches(&batches).unwrap();

        assert_eq!(timeline.len(), 48);
        assert!(timeline.observations().windows(2).all(|p| p[0].timestamp < p[1].timestamp));
    }

    #[test]
    fn target_absent_from_timeline() {
        let batches = vec![day(date(12), 0..24), day(date(13), 0..10)];

        let result = align(&batches, date(13), 15);
        assert_eq!(result, Err(AlignmentError::TargetNotFound(date(13).and_hms_opt(15, 0, 0).unwrap())));
    }

    #[test]
    fn insufficient_history_on_first_day() {
        let batches = vec![day(date(12), 0..24), day(date(13), 0..24)];

        let result = align(&batches, date(12), 22);
        assert!(matches!(result, Err(AlignmentError::InsufficientHistory { available: 22, .. })));

        assert!(align(&batches, date(12), 23).is_ok());
    }

    #[test]
    fn scenario_e_hour_23_with_only_20_prior_hours() {
        // The first day delivered nothing and the second day starts at 03:00
        let batches = vec![day(date(12), 0..0), day(date(13), 3..24)];

        let result = align(&batches, date(13), 23);
        assert_eq!(result, Err(AlignmentError::InsufficientHistory {
            target: date(13).and_hms_opt(23, 0, 0).unwrap(),
            available: 20,
            needed: 23,
        }));
    }

    #[test]
    fn gaps_inside_window_are_rejected() {
        let mut batches = vec![day(date(12), 0..24), day(date(13), 0..24)];
        batches[1].hours.remove(5);

        let result = align(&batches, date(13), 10);
        assert_eq!(result, Err(AlignmentError::NonContiguous(
            date(13).and_hms_opt(4, 0, 0).unwrap(),
            date(13).and_hms_opt(6, 0, 0).unwrap(),
        )));
    }

    #[test]
    fn identical_duplicates_collapse_conflicting_fail() {
        let batches = vec![day(date(12), 0..24), day(date(12), 12..24)];
        assert_eq!(Timeline::from_batches(&batches).unwrap().len(), 24);

        let mut conflicting = day(date(12), 12..13);
        conflicting.hours[0].features.insert("temp".to_string(), 99.0);
        let batches = vec![day(date(12), 0..24), conflicting];
        assert_eq!(
            Timeline::from_batches(&batches),
            Err(AlignmentError::DuplicateTimestamp(date(12).and_hms_opt(12, 0, 0).unwrap()))
        );
    }

    #[test]
    fn malformed_time_of_day() {
        let mut batches = vec![day(date(12), 0..24)];
        batches[0].hours[3].time_of_day = "3 o'clock".to_string();

        assert_eq!(
            Timeline::from_batches(&batches),
            Err(AlignmentError::MalformedTime("3 o'clock".to_string()))
        );
        assert!(matches!(align(&[day(date(12), 0..24)], date(12), 24), Err(AlignmentError::MalformedTime(_))));
    }
}
