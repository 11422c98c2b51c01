//! Small numeric helpers shared by the content filter and the scorer.

/// Round to two decimals, the precision used throughout the output feed.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N); 0 for an empty slice.
pub fn population_sigma(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percent change from `base` to `last`, rounded to two decimals.
/// Undefined when the baseline is exactly zero.
pub fn pct_change(last: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    Some(round2((last - base) / base * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigma_of_constant_series_is_zero() {
        assert_eq!(population_sigma(&[5.0; 10]), 0.0);
    }

    #[test]
    fn sigma_divides_by_n() {
        // mean 5, squared deviations sum 32, N = 8
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(population_sigma(&values), 2.0);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_sigma(&[]), 0.0);
    }

    #[test]
    fn pct_change_zero_baseline_is_none() {
        assert_eq!(pct_change(42.0, 0.0), None);
        assert_eq!(pct_change(0.0, 0.0), None);
    }

    #[test]
    fn pct_change_rounds() {
        assert_eq!(pct_change(80.0, 30.0), Some(166.67));
        assert_eq!(pct_change(10.0, 20.0), Some(-50.0));
    }
}
