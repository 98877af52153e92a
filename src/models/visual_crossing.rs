use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::Deserialize;
use crate::time_series::{DayBatch, HourRecord};

#[derive(Deserialize, Debug)]
pub struct TimelineHour {
    pub datetime: String,
    pub temp: Option<f64>,
    pub dew: Option<f64>,
    pub humidity: Option<f64>,
    pub windspeed: Option<f64>,
    pub windgust: Option<f64>,
    pub winddir: Option<f64>,
    pub pressure: Option<f64>,
    pub solarenergy: Option<f64>,
    pub cloudcover: Option<f64>,
    pub solarradiation: Option<f64>,
    pub uvindex: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct TimelineDay {
    pub datetime: NaiveDate,
    #[serde(default)]
    pub hours: Vec<TimelineHour>,
}

#[derive(Deserialize, Debug)]
pub struct Timeline {
    #[serde(rename = "resolvedAddress")]
    pub resolved_address: Option<String>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub days: Vec<TimelineDay>,
}

impl TimelineHour {
    /// Non null weather fields keyed by their document name
    pub fn features(&self) -> BTreeMap<String, f64> {
        [
            ("temp", self.temp),
            ("dew", self.dew),
            ("humidity", self.humidity),
            ("windspeed", self.windspeed),
            ("windgust", self.windgust),
            ("winddir", self.winddir),
            ("pressure", self.pressure),
            ("solarenergy", self.solarenergy),
            ("cloudcover", self.cloudcover),
            ("solarradiation", self.solarradiation),
            ("uvindex", self.uvindex),
        ]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .collect()
    }
}

impl From<&TimelineDay> for DayBatch {
    fn from(day: &TimelineDay) -> Self {
        DayBatch {
            date: day.datetime,
            hours: day.hours.iter()
                .map(|h| HourRecord { time_of_day: h.datetime.clone(), features: h.features() })
                .collect(),
        }
    }
}
