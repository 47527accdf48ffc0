//! Fixed-alpha moving averages: SMA, EMA, RMA (Wilder), DEMA, TEMA.
//!
//! EMA and RMA are seeded with the SMA of their first `length` valid values,
//! so the first output sits at index `length - 1` after any NaN prefix.
//! A NaN after the seed taints the rest of the series.

use crate::error::Result;
use crate::series::{ensure_finite, on_valid_tail, require_length};

/// Simple moving average.
pub fn sma(values: &[f64], length: usize) -> Result<Vec<f64>> {
    require_length("length", length)?;
    on_valid_tail(values, length, |tail| {
        let n = tail.len();
        let mut result = vec![f64::NAN; n];
        let mut sum = 0.0;
        for i in 0..n {
            sum += tail[i];
            if i >= length {
                sum -= tail[i - length];
            }
            if i + 1 >= length {
                result[i] = sum / length as f64;
            }
        }
        result
    })
}

/// Exponential moving average, alpha = 2 / (length + 1).
pub fn ema(values: &[f64], length: usize) -> Result<Vec<f64>> {
    require_length("length", length)?;
    let alpha = 2.0 / (length as f64 + 1.0);
    on_valid_tail(values, length, |tail| seeded_ewm(tail, length, alpha))
}

/// Wilder's moving average, alpha = 1 / length.
pub fn rma(values: &[f64], length: usize) -> Result<Vec<f64>> {
    require_length("length", length)?;
    let alpha = 1.0 / length as f64;
    on_valid_tail(values, length, |tail| seeded_ewm(tail, length, alpha))
}

/// Double EMA: `2·EMA - EMA(EMA)`.
pub fn dema(values: &[f64], length: usize) -> Result<Vec<f64>> {
    let e1 = ensure_finite("DEMA", ema(values, length)?)?;
    let e2 = ensure_finite("DEMA", ema(&e1, length)?)?;
    let out = e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect();
    ensure_finite("DEMA", out)
}

/// Triple EMA: `3·E1 - 3·E2 + E3`.
pub fn tema(values: &[f64], length: usize) -> Result<Vec<f64>> {
    let e1 = ensure_finite("TEMA", ema(values, length)?)?;
    let e2 = ensure_finite("TEMA", ema(&e1, length)?)?;
    let e3 = ensure_finite("TEMA", ema(&e2, length)?)?;
    let out = (0..e1.len())
        .map(|i| 3.0 * (e1[i] - e2[i]) + e3[i])
        .collect();
    ensure_finite("TEMA", out)
}

/// EMA-style recursion seeded with the mean of the first `length` values.
fn seeded_ewm(tail: &[f64], length: usize, alpha: f64) -> Vec<f64> {
    let n = tail.len();
    let mut result = vec![f64::NAN; n];
    if n < length || length == 0 {
        return result;
    }

    let seed_window = &tail[..length];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let seed = seed_window.iter().sum::<f64>() / length as f64;
    result[length - 1] = seed;

    let mut prev = seed;
    for i in length..n {
        if tail[i].is_nan() {
            return result;
        }
        prev = alpha * tail[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;
    use crate::testutil::{assert_approx, nan_prefix, DEFAULT_EPSILON};

    #[test]
    fn sma_basic() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(nan_prefix(&out), 2);
        assert_approx(out[2], 2.0, DEFAULT_EPSILON);
        assert_approx(out[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_seed_is_sma() {
        let out = ema(&[10.0, 11.0, 12.0, 13.0, 14.0], 3).unwrap();
        assert_eq!(nan_prefix(&out), 2);
        assert_approx(out[2], 11.0, DEFAULT_EPSILON);
        // alpha = 0.5
        assert_approx(out[3], 0.5 * 13.0 + 0.5 * 11.0, DEFAULT_EPSILON);
        assert_approx(out[4], 0.5 * 14.0 + 0.5 * 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rma_uses_wilder_alpha() {
        let out = rma(&[2.0, 4.0, 6.0, 8.0], 2).unwrap();
        assert_approx(out[1], 3.0, DEFAULT_EPSILON);
        assert_approx(out[2], 0.5 * 6.0 + 0.5 * 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_skips_nan_prefix() {
        let out = ema(&[f64::NAN, f64::NAN, 1.0, 2.0, 3.0], 2).unwrap();
        assert_eq!(nan_prefix(&out), 3);
        assert_approx(out[3], 1.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_after_seed_propagates() {
        let out = ema(&[1.0, 2.0, 3.0, f64::NAN, 5.0], 2).unwrap();
        assert!(out[2].is_finite());
        assert!(out[3].is_nan() && out[4].is_nan());
    }

    #[test]
    fn dema_needs_two_windows() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let out = dema(&closes, 3).unwrap();
        assert_eq!(nan_prefix(&out), 4);
        // A linear ramp is tracked exactly by DEMA once warmed up.
        assert_approx(out[9], 10.0, 1e-9);
    }

    #[test]
    fn tema_rejects_short_input() {
        let closes: Vec<f64> = (1..=5).map(f64::from).collect();
        assert!(matches!(
            tema(&closes, 3),
            Err(IndicatorError::InsufficientData { .. })
        ));
    }

    #[test]
    fn too_short_is_insufficient() {
        assert_eq!(
            sma(&[1.0, 2.0], 3),
            Err(IndicatorError::InsufficientData {
                required: 3,
                got: 2
            })
        );
    }

    #[test]
    fn zero_length_errors() {
        let x = [1.0, 2.0, 3.0];
        for out in [sma(&x, 0), ema(&x, 0), rma(&x, 0)] {
            assert!(matches!(out, Err(IndicatorError::ZeroLength { .. })));
        }
    }
}
