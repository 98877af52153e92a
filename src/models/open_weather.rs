use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Deserialize, Debug)]
pub struct Main {
    pub aqi: u8,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct Components {
    pub co: f64,
    pub no: Option<f64>,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct PollutionEntry {
    pub dt: i64,
    pub main: Option<Main>,
    pub components: Components,
}

#[derive(Deserialize, Debug)]
pub struct PollutionHistory {
    pub coord: Option<Coord>,
    #[serde(default)]
    pub list: Vec<PollutionEntry>,
}

impl Components {
    /// The six forecast targets in model order
    pub fn targets(&self) -> [f64; 6] {
        [self.so2, self.no2, self.pm10, self.pm2_5, self.o3, self.co]
    }
}
