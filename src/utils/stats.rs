//! Statistical utility functions.
//!
//! Variances here are population variances (divisor `n`), the convention the
//! periodogram normalizations are defined against.

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the population variance of a slice (divisor `n`).
///
/// # Example
/// ```
/// use anofox_periodogram::utils::population_variance;
///
/// let var = population_variance(&[1.0, 2.0, 3.0, 4.0]);
/// assert!((var - 1.25).abs() < 1e-12);
/// ```
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Weighted mean `Σ wᵢxᵢ / Σ wᵢ`.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return f64::NAN;
    }
    values
        .iter()
        .zip(weights.iter())
        .map(|(x, w)| w * x)
        .sum::<f64>()
        / total
}

/// Weighted population variance `Σ wᵢ(xᵢ − x̄_w)² / Σ wᵢ`.
pub fn weighted_variance(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return f64::NAN;
    }
    let m = weighted_mean(values, weights);
    values
        .iter()
        .zip(weights.iter())
        .map(|(x, w)| w * (x - m).powi(2))
        .sum::<f64>()
        / total
}

/// Calculate the median of a slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n.is_multiple_of(2) {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Fractional part in `[0, 1)`, also for negative arguments.
#[inline]
pub fn frac(x: f64) -> f64 {
    let f = x - x.floor();
    // x - floor(x) rounds up to 1.0 for tiny negative x
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}
