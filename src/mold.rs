//! Mold-growth risk index derived from daily mean temperature and humidity.

use std::fmt;

/// Humidity below this never supports mold growth.
const HUMIDITY_FLOOR_PERCENT: f64 = 80.0;
/// Temperature divisor normalizing the humidity excess.
const TEMPERATURE_SCALE_C: f64 = 15.0;

/// Risk index for a (temperature, humidity) pair.
///
/// Zero when humidity is at or below 80 %, otherwise the humidity excess
/// scaled by `T / 15`. Clamped at zero so sub-freezing temperatures cannot
/// produce a negative index.
pub fn risk(temperature_c: f64, humidity_percent: f64) -> f64 {
    if humidity_percent <= HUMIDITY_FLOOR_PERCENT {
        return 0.0;
    }
    let index = (humidity_percent - HUMIDITY_FLOOR_PERCENT) * (temperature_c / TEMPERATURE_SCALE_C);
    index.max(0.0)
}

/// Qualitative band for a risk index. Boundaries are half-open at 1, 5, 10
/// and 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Negligible,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_risk(risk: f64) -> Self {
        if risk < 1.0 {
            RiskLevel::Negligible
        } else if risk < 5.0 {
            RiskLevel::Low
        } else if risk < 10.0 {
            RiskLevel::Moderate
        } else if risk < 20.0 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Negligible => write!(f, "Negligible"),
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::VeryHigh => write!(f, "Very high"),
        }
    }
}
