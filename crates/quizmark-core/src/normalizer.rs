//! Score normalization for partial-credit choice questions.
//!
//! Normalization maps a raw point total to a reported score. It runs after
//! the raw partial-credit sum and before the final clamp into the question's
//! point range.

use crate::model::Normalization;

/// Map a raw score through `method`.
///
/// Degenerate parameters (`std_dev == 0`, `input_min == input_max`) and
/// unmapped custom keys pass the raw score through unchanged.
pub fn normalize(raw: f64, max_points: f64, method: &Normalization) -> f64 {
    match method {
        Normalization::None => raw,
        Normalization::ZScore { mean, std_dev } => {
            if std_dev.abs() < f64::EPSILON {
                tracing::debug!("zscore std_dev is zero, passing raw score {raw} through");
                return raw;
            }
            // Compresses toward `mean` rather than standardizing: one std_dev
            // above the mean moves the result by std_dev * max_points / 8.
            let z = (raw - mean) / std_dev;
            (mean + z * (std_dev / 4.0) * (max_points / 2.0)).round()
        }
        Normalization::MinMax {
            input_min,
            input_max,
            output_min,
            output_max,
        } => {
            let span = input_max - input_min;
            if span.abs() < f64::EPSILON {
                tracing::debug!("minmax input range is empty, passing raw score {raw} through");
                return raw;
            }
            (output_min + (raw - input_min) / span * (output_max - output_min)).round()
        }
        Normalization::Custom { mapping } => match mapping.get(&mapping_key(raw)) {
            Some(adjusted) => *adjusted,
            None => {
                tracing::debug!("no custom mapping for raw score {raw}, passing through");
                raw
            }
        },
    }
}

/// The lookup key for a raw score: `5.0` is `"5"`, `2.5` is `"2.5"`.
pub fn mapping_key(raw: f64) -> String {
    if raw == 0.0 {
        // Avoids "-0" for a negative-zero sum.
        return "0".to_string();
    }
    raw.to_string()
}

/// Clamp `points` into `[minimum, maximum]`, where the floor itself is
/// kept inside `[0, maximum]`.
pub fn clamp_points(points: f64, minimum: f64, maximum: f64) -> f64 {
    let maximum = maximum.max(0.0);
    let minimum = minimum.max(0.0).min(maximum);
    points.max(minimum).min(maximum)
}
