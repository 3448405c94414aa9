//! Robust and classical statistics over pixel buffers: median, MAD, mean, sigma.

use std::cmp::Ordering;

/// Median of `values`, reordering the buffer in place.
///
/// Even-length buffers average the two middle elements. Returns 0.0 when empty.
pub fn median_mut(values: &mut [f32]) -> f64 {
    let len = values.len();
    if len == 0 {
        return 0.0;
    }
    let mid = len / 2;
    let cmp = |a: &f32, b: &f32| a.partial_cmp(b).unwrap_or(Ordering::Equal);

    let (left, upper, _) = values.select_nth_unstable_by(mid, cmp);
    let upper = *upper as f64;
    if len % 2 == 1 {
        upper
    } else {
        let lower = left.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
        (lower + upper) / 2.0
    }
}

/// Median of `values` without touching the caller's buffer.
pub fn median(values: &[f32]) -> f64 {
    let mut scratch = values.to_vec();
    median_mut(&mut scratch)
}

/// Median and MAD (median absolute deviation) of `values`.
///
/// MAD = median(|x_i - median(x)|), unscaled.
pub fn median_and_mad(values: &[f32]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mut scratch = values.to_vec();
    let med = median_mut(&mut scratch);
    for v in scratch.iter_mut() {
        *v = (*v as f64 - med).abs() as f32;
    }
    let mad = median_mut(&mut scratch);
    (med, mad)
}

pub fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_median_mut_reorders_only_scratch() {
        let original = vec![5.0, 9.0, 1.0, 7.0, 3.0];
        let m = median(&original);
        assert_eq!(m, 5.0);
        assert_eq!(original, vec![5.0, 9.0, 1.0, 7.0, 3.0]);
    }

    #[test]
    fn test_median_and_mad() {
        // deviations from 3: 2, 1, 0, 1, 6 -> median 1
        let (med, mad) = median_and_mad(&[1.0, 2.0, 3.0, 4.0, 9.0]);
        assert_eq!(med, 3.0);
        assert!((mad - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_std_dev_population() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((std_dev(&values) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_values_have_zero_spread() {
        let values = [0.25f32; 16];
        assert_eq!(std_dev(&values), 0.0);
        assert_eq!(median_and_mad(&values).1, 0.0);
    }
}
