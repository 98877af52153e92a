pub mod aqi;
pub mod config;
pub mod errors;
pub mod features;
pub mod forecast;
pub mod initialization;
pub mod manager_pollution;
pub mod manager_weather;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod pollutants;
pub mod scaling;
pub mod time_series;
pub mod validation;
