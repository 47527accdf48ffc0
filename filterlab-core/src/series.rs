//! Input validation, warm-up handling and small rolling helpers shared by
//! every recurrence.

use crate::error::{IndicatorError, Result};

/// Index of the first non-NaN value.
pub fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

/// Check that `values` holds at least `min_len` samples after its NaN prefix.
pub fn verify(values: &[f64], min_len: usize) -> Result<()> {
    let available = match first_valid(values) {
        Some(start) => values.len() - start,
        None => 0,
    };
    if available < min_len.max(1) {
        return Err(IndicatorError::InsufficientData {
            required: min_len.max(1),
            got: available,
        });
    }
    Ok(())
}

/// Reject a zero window length.
pub fn require_length(param: &'static str, length: usize) -> Result<()> {
    if length == 0 {
        return Err(IndicatorError::ZeroLength { param });
    }
    Ok(())
}

/// Check that every series in `others` has length `expected`.
pub fn verify_aligned(expected: usize, others: &[&[f64]]) -> Result<()> {
    for series in others {
        if series.len() != expected {
            return Err(IndicatorError::LengthMismatch {
                expected,
                got: series.len(),
            });
        }
    }
    Ok(())
}

/// Run `compute` on the part of `values` after its NaN prefix and pad the
/// result back to full length.
///
/// `compute` receives a slice whose first element is finite and which holds
/// at least `min_len` values; it must return a series of the same length.
pub fn on_valid_tail<F>(values: &[f64], min_len: usize, compute: F) -> Result<Vec<f64>>
where
    F: FnOnce(&[f64]) -> Vec<f64>,
{
    verify(values, min_len)?;
    let start = first_valid(values).unwrap_or(values.len());
    let mut out = vec![f64::NAN; start];
    out.extend(compute(&values[start..]));
    debug_assert_eq!(out.len(), values.len());
    Ok(out)
}

/// Emergency break: reject a series in which no value is finite.
pub fn ensure_finite(stage: &'static str, values: Vec<f64>) -> Result<Vec<f64>> {
    if values.iter().any(|v| v.is_finite()) {
        Ok(values)
    } else {
        tracing::debug!(stage, len = values.len(), "emergency break: no finite output");
        Err(IndicatorError::EmergencyBreak { stage })
    }
}

/// Overwrite the first `count` values with NaN.
pub fn mask_prefix(values: &mut [f64], count: usize) {
    for v in values.iter_mut().take(count) {
        *v = f64::NAN;
    }
}

/// Rolling maximum over `window` bars. NaN until the window is full or while
/// it contains a NaN.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, f64::max)
}

/// Rolling minimum over `window` bars.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, f64::min)
}

fn rolling_extreme(values: &[f64], window: usize, pick: fn(f64, f64) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().copied().fold(slice[0], pick);
    }
    result
}

/// Fixed-depth lag buffer: `get(0)` is the newest value, `get(k)` the value
/// pushed `k` updates ago. Unfilled slots read as zero.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lags<const N: usize> {
    values: [f64; N],
}

impl<const N: usize> Lags<N> {
    pub fn new() -> Self {
        Self { values: [0.0; N] }
    }

    pub fn push(&mut self, value: f64) {
        self.values.copy_within(0..N - 1, 1);
        self.values[0] = value;
    }

    pub fn get(&self, lag: usize) -> f64 {
        self.values.get(lag).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_counts_after_nan_prefix() {
        let values = [f64::NAN, f64::NAN, 1.0, 2.0];
        assert!(verify(&values, 2).is_ok());
        assert_eq!(
            verify(&values, 3),
            Err(IndicatorError::InsufficientData {
                required: 3,
                got: 2
            })
        );
    }

    #[test]
    fn verify_rejects_all_nan() {
        let values = [f64::NAN; 4];
        assert_eq!(
            verify(&values, 1),
            Err(IndicatorError::InsufficientData {
                required: 1,
                got: 0
            })
        );
    }

    #[test]
    fn on_valid_tail_pads_prefix() {
        let values = [f64::NAN, 1.0, 2.0];
        let out = on_valid_tail(&values, 1, |tail| tail.iter().map(|v| v * 10.0).collect())
            .unwrap();
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[10.0, 20.0]);
    }

    #[test]
    fn ensure_finite_breaks_on_all_nan() {
        assert!(ensure_finite("TEST", vec![f64::NAN, f64::INFINITY]).is_err());
        assert!(ensure_finite("TEST", vec![f64::NAN, 1.0]).is_ok());
    }

    #[test]
    fn rolling_extremes() {
        let values = [1.0, 3.0, 2.0, 5.0, 4.0];
        let max = rolling_max(&values, 3);
        let min = rolling_min(&values, 3);
        assert!(max[1].is_nan());
        assert_eq!(&max[2..], &[3.0, 5.0, 5.0]);
        assert_eq!(&min[2..], &[1.0, 2.0, 2.0]);
    }

    #[test]
    fn lags_shift_newest_first() {
        let mut lags = Lags::<3>::new();
        lags.push(1.0);
        lags.push(2.0);
        assert_eq!(lags.get(0), 2.0);
        assert_eq!(lags.get(1), 1.0);
        assert_eq!(lags.get(2), 0.0);
        lags.push(3.0);
        lags.push(4.0);
        assert_eq!(lags.get(2), 2.0);
        assert_eq!(lags.get(7), 0.0);
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(require_length("length", 1).is_ok());
        assert!(matches!(
            require_length("slow", 0),
            Err(IndicatorError::ZeroLength { param: "slow" })
        ));
    }
}
