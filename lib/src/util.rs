use rand::Rng;

use crate::error::{Result, SimulationError};

/// Formats a fraction as a percentage with at most two decimals, e.g. `0.1234` as `12.34%`.
pub fn format_percent(value: f64) -> String {
    let formatted = format!("{:.2}", value * 100.0);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", trimmed)
}

/// Truncates a fraction to a percentage with two decimals, e.g. `0.123456` to `12.34`.
pub fn truncate_percent(value: f64) -> f64 {
    (value * 10000.0).trunc() / 100.0
}

pub fn check_range<T: Into<f64> + PartialOrd + Copy>(name: &'static str, min: T, max: T) -> Result<()> {
    if max < min {
        return Err(SimulationError::InvertedRange {
            name,
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}

/// Samples from `[min, max)`, collapsing to `min` when the range is empty.
pub fn sample_half_open(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..max)
    }
}

/// Samples from `[min, max]`.
pub fn sample_closed(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}
