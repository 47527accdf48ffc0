//! Zero Lag Moving Average (ZLMA).
//!
//! Removes the average's lag by smoothing the de-lagged series
//! `2·p[i] - p[i-lag]`, `lag = (length - 1) / 2`, with an explicitly chosen
//! inner smoother.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, require_length};

use super::MovingAverage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZlmaParams {
    pub length: usize,
    /// Inner smoother applied to the de-lagged series.
    pub ma: MovingAverage,
}

impl Default for ZlmaParams {
    fn default() -> Self {
        Self {
            length: 10,
            ma: MovingAverage::Ema { length: 10 },
        }
    }
}

impl ZlmaParams {
    pub fn new(length: usize, ma: MovingAverage) -> Self {
        Self { length, ma }
    }

    /// `length` plus `mamode`, the inner smoother's short name (default `ema`).
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), 10);
        let ma = n.choice(
            "mamode",
            raw.get("mamode"),
            MovingAverage::Ema { length },
            |name| MovingAverage::from_name(name, length),
        );
        n.finish(Self { length, ma })
    }

    pub fn label(&self) -> String {
        format!("ZL_{}_{}", self.ma.label(), self.length)
    }

    pub fn lag(&self) -> usize {
        self.length.saturating_sub(1) / 2
    }
}

/// Compute ZLMA over `values`.
pub fn zlma(values: &[f64], params: &ZlmaParams) -> Result<Vec<f64>> {
    require_length("length", params.length)?;
    let delagged = ensure_finite("ZLMA", delag(values, params.lag()))?;
    let out = params.ma.apply(&delagged)?;
    ensure_finite("ZLMA", out)
}

fn delag(values: &[f64], lag: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i < lag {
                f64::NAN
            } else {
                2.0 * v - values[i - lag]
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Zlma {
    params: ZlmaParams,
    source: PriceSource,
    name: String,
}

impl Zlma {
    pub fn new(params: ZlmaParams, source: PriceSource) -> Self {
        Self {
            name: params.label(),
            params,
            source,
        }
    }
}

impl Indicator for Zlma {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        self.params.lag() + self.params.ma.lookback()
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let values = zlma(&self.source.extract(bars), &self.params)?;
        Ok(vec![Column::float(&self.name, Category::Overlap, values)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawValue;
    use crate::testutil::{assert_approx, nan_prefix, DEFAULT_EPSILON};

    #[test]
    fn delag_doubles_against_lagged_price() {
        let d = delag(&[1.0, 2.0, 4.0, 8.0], 2);
        assert!(d[0].is_nan() && d[1].is_nan());
        assert_eq!(&d[2..], &[7.0, 14.0]);
    }

    #[test]
    fn ramp_has_no_lag_with_sma() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let p = ZlmaParams::new(5, MovingAverage::Sma { length: 5 });
        let out = zlma(&closes, &p).unwrap();
        // lag 2 then a 5-bar window
        assert_eq!(nan_prefix(&out), 6);
        assert_approx(out[10], closes[10], DEFAULT_EPSILON);
    }

    #[test]
    fn inner_smoother_is_explicit() {
        let mut raw = ParamMap::new();
        raw.insert("length".into(), RawValue::Int(8));
        raw.insert("mamode".into(), RawValue::from("jma"));
        let norm = ZlmaParams::normalize(&raw);
        assert!(norm.is_clean());
        assert_eq!(norm.params.label(), "ZL_JMA_8");

        raw.insert("mamode".into(), RawValue::from("nope"));
        let norm = ZlmaParams::normalize(&raw);
        assert_eq!(norm.params.ma, MovingAverage::Ema { length: 8 });
        assert_eq!(norm.adjustments.len(), 1);
    }

    #[test]
    fn zero_length_errors() {
        let p = ZlmaParams {
            length: 0,
            ma: MovingAverage::Ema { length: 0 },
        };
        assert_eq!(p.lag(), 0);
        assert!(zlma(&[1.0, 2.0, 3.0, 4.0], &p).is_err());
    }
}
