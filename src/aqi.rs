use std::collections::HashMap;
use std::fmt;
use crate::errors::FeatureValidationError;
use crate::pollutants::{Physical, PollutantCode, PollutantVector, POLLUTANT_COUNT};

/// Ordered air quality tiers, Good is best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AqiTier {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
}

impl AqiTier {
    /// Human readable level name
    pub fn name(&self) -> &'static str {
        match self {
            AqiTier::Good     => "Good",
            AqiTier::Fair     => "Fair",
            AqiTier::Moderate => "Moderate",
            AqiTier::Poor     => "Poor",
            AqiTier::VeryPoor => "Very Poor",
        }
    }

    /// Name usable inside metric names
    pub fn slug(&self) -> &'static str {
        match self {
            AqiTier::Good     => "good",
            AqiTier::Fair     => "fair",
            AqiTier::Moderate => "moderate",
            AqiTier::Poor     => "poor",
            AqiTier::VeryPoor => "very_poor",
        }
    }
}

impl fmt::Display for AqiTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Half open concentration range [lower, upper)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub lower: f64,
    pub upper: f64,
}

impl Range {
    const fn new(lower: f64, upper: f64) -> Range {
        Range { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value < self.upper
    }
}

/// One tier and its range for each pollutant, indexed in target order
pub struct TierRanges {
    pub tier: AqiTier,
    pub ranges: [Range; POLLUTANT_COUNT],
}

const INF: f64 = f64::INFINITY;

/// Threshold table in µg/m³, columns so2, no2, pm10, pm2_5, o3, co
pub static AQI_RANGES: [TierRanges; 5] = [
    TierRanges { tier: AqiTier::Good, ranges: [
        Range::new(0.0, 20.0), Range::new(0.0, 40.0), Range::new(0.0, 20.0),
        Range::new(0.0, 10.0), Range::new(0.0, 60.0), Range::new(0.0, 4400.0)] },
    TierRanges { tier: AqiTier::Fair, ranges: [
        Range::new(20.0, 80.0), Range::new(40.0, 70.0), Range::new(20.0, 50.0),
        Range::new(10.0, 25.0), Range::new(60.0, 100.0), Range::new(4400.0, 9400.0)] },
    TierRanges { tier: AqiTier::Moderate, ranges: [
        Range::new(80.0, 250.0), Range::new(70.0, 150.0), Range::new(50.0, 100.0),
        Range::new(25.0, 50.0), Range::new(100.0, 140.0), Range::new(9400.0, 12400.0)] },
    TierRanges { tier: AqiTier::Poor, ranges: [
        Range::new(250.0, 350.0), Range::new(150.0, 200.0), Range::new(100.0, 200.0),
        Range::new(50.0, 75.0), Range::new(140.0, 180.0), Range::new(12400.0, 15400.0)] },
    TierRanges { tier: AqiTier::VeryPoor, ranges: [
        Range::new(350.0, INF), Range::new(200.0, INF), Range::new(200.0, INF),
        Range::new(75.0, INF), Range::new(180.0, INF), Range::new(15400.0, INF)] },
];

/// Tier of every pollutant plus the overall (worst) tier
#[derive(Debug, Clone, PartialEq)]
pub struct AqiReport {
    pub overall: AqiTier,
    pub per_pollutant: Vec<(PollutantCode, AqiTier)>,
}

impl AqiReport {
    /// Pollutants that are responsible for the overall tier
    pub fn governing(&self) -> Vec<PollutantCode> {
        self.per_pollutant.iter()
            .filter(|(_, t)| *t == self.overall)
            .map(|(c, _)| *c)
            .collect()
    }
}

/// Tier of a single pollutant concentration.
///
/// Scans tiers from Good upwards and returns the first range holding the value. Values below
/// zero are scored Good and anything at or above the last finite bound lands in Very Poor.
///
/// # Arguments
///
/// * 'code' - the pollutant
/// * 'value' - concentration in µg/m³
pub fn pollutant_tier(code: PollutantCode, value: f64) -> AqiTier {
    if value < AQI_RANGES[0].ranges[code.index()].lower {
        return AqiTier::Good;
    }

    AQI_RANGES.iter()
        .find(|t| t.ranges[code.index()].contains(value))
        .map_or(AqiTier::VeryPoor, |t| t.tier)
}

/// Classifies a physical pollutant vector, the worst individual pollutant tier governs
///
/// # Arguments
///
/// * 'pollutants' - concentrations in µg/m³
pub fn classify(pollutants: &PollutantVector<Physical>) -> AqiReport {
    let per_pollutant = pollutants.iter()
        .map(|(code, value)| (code, pollutant_tier(code, value)))
        .collect::<Vec<(PollutantCode, AqiTier)>>();

    let overall = per_pollutant.iter()
        .map(|(_, tier)| *tier)
        .max()
        .unwrap_or(AqiTier::Good);

    AqiReport { overall, per_pollutant }
}

/// Classifies a code keyed map, all six pollutant codes must be present
///
/// # Arguments
///
/// * 'pollutants' - pollutant code to concentration in µg/m³
pub fn classify_map(pollutants: &HashMap<String, f64>) -> Result<AqiReport, FeatureValidationError> {
    let vector = PollutantVector::<Physical>::from_map(pollutants)?;

    Ok(classify(&vector))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_b() -> HashMap<String, f64> {
        [("so2", 15.0), ("no2", 35.0), ("pm10", 18.0), ("pm2_5", 8.0), ("o3", 50.0), ("co", 4000.0)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn scenario_b_all_good() {
        let report = classify_map(&scenario_b()).unwrap();
        assert_eq!(report.overall, AqiTier::Good);
        assert!(report.per_pollutant.iter().all(|(_, t)| *t == AqiTier::Good));
    }

    #[test]
    fn scenario_c_worst_pollutant_governs() {
        let mut map = scenario_b();
        map.insert("pm2_5".to_string(), 80.0);

        let report = classify_map(&map).unwrap();
        assert_eq!(report.overall, AqiTier::VeryPoor);
        assert_eq!(report.overall.name(), "Very Poor");
        assert_eq!(report.governing(), vec![PollutantCode::Pm2_5]);
    }

    #[test]
    fn scenario_d_lower_bound_inclusive() {
        assert_eq!(pollutant_tier(PollutantCode::So2, 20.0), AqiTier::Fair);
        assert_eq!(pollutant_tier(PollutantCode::So2, 19.999), AqiTier::Good);

        let mut map = scenario_b();
        map.insert("so2".to_string(), 20.0);
        assert_eq!(classify_map(&map).unwrap().overall, AqiTier::Fair);
    }

    #[test]
    fn every_boundary_moves_up_one_tier() {
        for code in PollutantCode::ALL {
            for pair in AQI_RANGES.windows(2) {
                let bound = pair[0].ranges[code.index()].upper;
                assert_eq!(pair[1].ranges[code.index()].lower, bound);
                assert_eq!(pollutant_tier(code, bound), pair[1].tier);
            }
        }
    }

    #[test]
    fn huge_and_negative_values_stay_total() {
        assert_eq!(pollutant_tier(PollutantCode::Co, 1.0e12), AqiTier::VeryPoor);
        assert_eq!(pollutant_tier(PollutantCode::O3, -3.5), AqiTier::Good);
        assert_eq!(pollutant_tier(PollutantCode::No2, 0.0), AqiTier::Good);
    }

    #[test]
    fn classification_is_monotonic_per_pollutant() {
        let base = [15.0, 35.0, 18.0, 8.0, 50.0, 4000.0];
        for code in PollutantCode::ALL {
            let mut values = base;
            let mut last = classify(&PollutantVector::new(values)).overall;
            for step in 1..400 {
                values[code.index()] = base[code.index()] + step as f64 * (if code == PollutantCode::Co { 50.0 } else { 1.0 });
                let tier = classify(&PollutantVector::new(values)).overall;
                assert!(tier >= last, "{} at {} dropped from {} to {}", code, values[code.index()], last, tier);
                last = tier;
            }
        }
    }

    #[test]
    fn missing_code_is_feature_validation_error() {
        let mut map = scenario_b();
        map.remove("o3");
        assert_eq!(classify_map(&map), Err(FeatureValidationError::MissingPollutant(PollutantCode::O3)));
    }
}
