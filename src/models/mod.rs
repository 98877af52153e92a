pub mod open_weather;
pub mod visual_crossing;
