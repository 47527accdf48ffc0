//! Average True Range, the volatility leaf consumed by the stop engines.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR uses Wilder smoothing (alpha = 1/length) seeded with the mean of the
//! first `length` true ranges. TR[0] has no previous close and is left out,
//! so the first ATR value sits at index `length`.

use crate::backend::{Capabilities, ReferenceRequest};
use crate::domain::{Bar, Category, Column, Ohlc};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::verify_aligned;
use crate::smoothers::basic;

/// True range per bar. TR[0] is NaN.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Result<Vec<f64>> {
    verify_aligned(high.len(), &[low, close])?;
    let n = high.len();
    let mut tr = vec![f64::NAN; n];
    for i in 1..n {
        let (h, l, pc) = (high[i], low[i], close[i - 1]);
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }
    Ok(tr)
}

/// Wilder smoothing of an arbitrary series.
pub fn rma(values: &[f64], length: usize) -> Result<Vec<f64>> {
    basic::rma(values, length)
}

/// Average True Range. NaN through index `length - 1`.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Result<Vec<f64>> {
    let tr = true_range(high, low, close)?;
    rma(&tr, length)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtrParams {
    pub length: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { length: 14 }
    }
}

impl AtrParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), 14);
        n.finish(Self { length })
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    params: AtrParams,
    name: String,
}

impl Atr {
    pub fn new(params: AtrParams) -> Self {
        Self {
            name: format!("ATRr_{}", params.length),
            params,
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Volatility
    }

    fn lookback(&self) -> usize {
        self.params.length
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let ohlc = Ohlc::from_bars(bars);
        let request = ReferenceRequest {
            function: "ATR",
            inputs: vec![
                ohlc.high.as_slice(),
                ohlc.low.as_slice(),
                ohlc.close.as_slice(),
            ],
            params: vec![self.params.length as f64],
        };
        let values = caps.single_or(&request, || {
            atr(&ohlc.high, &ohlc.low, &ohlc.close, self.params.length)
        })?;
        Ok(vec![Column::float(&self.name, Category::Volatility, values)])
    }
}
