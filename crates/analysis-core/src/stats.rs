//! Small statistics helpers shared by the analytics crates.
//! All functions are total: degenerate input yields an empty or `None` result, never NaN.

use chrono::NaiveDate;
use std::collections::HashMap;

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Compute sample standard deviation.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Percentage change between consecutive values. The first (undefined) change is dropped,
/// as is any change from a zero base.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| if w[0] != 0.0 { Some((w[1] - w[0]) / w[0]) } else { None })
        .collect()
}

/// Returns keyed by the date of the later close. Zero bases are skipped.
pub fn dated_returns(closes: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    closes
        .windows(2)
        .filter(|w| w[0].1 != 0.0)
        .map(|w| (w[1].0, (w[1].1 - w[0].1) / w[0].1))
        .collect()
}

/// Keeps only the dates present in both series, in the order of `a`.
pub fn align(a: &[(NaiveDate, f64)], b: &[(NaiveDate, f64)]) -> (Vec<f64>, Vec<f64>) {
    let lookup: HashMap<NaiveDate, f64> = b.iter().copied().collect();
    a.iter()
        .filter_map(|(date, x)| lookup.get(date).map(|y| (*x, *y)))
        .unzip()
}

/// Pearson correlation of two equally long series.
/// `None` when the series are shorter than 2 or either has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for i in 0..n {
        let dx = x[i] - mx;
        let dy = y[i] - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= f64::EPSILON * f64::EPSILON || syy <= f64::EPSILON * f64::EPSILON {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    Some(r.clamp(-1.0, 1.0))
}

/// Keep a value only if it is a real number.
pub fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_dev() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // sample variance = 32 / 7
        assert!((std_dev(&data) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(std_dev(&[1.0]), 0.0);
    }

    #[test]
    fn test_pct_change_drops_first() {
        let returns = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.10).abs() < 1e-12);
        assert!(pct_change(&[100.0]).is_empty());
    }

    #[test]
    fn test_dated_returns_and_align() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let a = dated_returns(&[(d(1), 100.0), (d(2), 110.0), (d(4), 121.0)]);
        let b = dated_returns(&[(d(1), 50.0), (d(3), 55.0), (d(4), 44.0)]);

        assert_eq!(a.len(), 2);
        assert_eq!(a[0].0, d(2));

        let (x, y) = align(&a, &b);
        assert_eq!(x.len(), 1);
        assert!((x[0] - 0.10).abs() < 1e-12);
        assert!((y[0] + 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_pearson() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let inv: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &inv).unwrap() + 1.0).abs() < 1e-12);
        assert!(pearson(&x, &[3.0; 5]).is_none());
        assert!(pearson(&[1.0], &[2.0]).is_none());
    }

    #[test]
    fn test_finite() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
    }
}
