use serde::Serialize;

/// Change of a count between two adjacent windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRate {
    pub current: u64,
    pub previous: u64,
    pub percent: f64,
}

impl GrowthRate {
    /// With no previous activity any current activity counts as 100% growth.
    pub fn between(current: u64, previous: u64) -> Self {
        let percent = if previous == 0 {
            if current > 0 {
                100.0
            } else {
                0.0
            }
        } else {
            let delta = current as f64 - previous as f64;
            (delta / previous as f64 * 10_000.0).round() / 100.0
        };
        Self {
            current,
            previous,
            percent,
        }
    }
}

/// `numerator / denominator * 100`, two decimals; zero when the denominator is zero.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
