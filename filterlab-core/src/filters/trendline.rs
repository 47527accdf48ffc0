//! Hilbert Transform instantaneous trendline (HT_TRENDLINE).
//!
//! The instantaneous trend is the mean price over the current dominant cycle
//! (rounded smoothed period, capped by the history available). The trendline
//! is a 4-3-2-1 weighted average of that trend once more than 12 bars have
//! been seen; earlier bars carry the raw price.

use crate::backend::{Capabilities, ReferenceRequest};
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::filters::hilbert::{window_at, HilbertDiscriminator, WINDOW};
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, mask_prefix, on_valid_tail};

/// Bars that carry the raw price before the weighted trendline starts.
const RAW_BARS: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendlineParams {
    pub prenan: usize,
}

impl Default for TrendlineParams {
    fn default() -> Self {
        Self { prenan: 63 }
    }
}

impl TrendlineParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let mut n = Normalizer::new();
        let prenan = n.count("prenan", raw.get("prenan"), 63);
        n.finish(Self { prenan })
    }
}

/// Compute the instantaneous trendline over `values`.
pub fn ht_trendline(values: &[f64], params: &TrendlineParams) -> Result<Vec<f64>> {
    let out = on_valid_tail(values, params.prenan + 1, |tail| {
        let mut out = trendline_tail(tail);
        mask_prefix(&mut out, params.prenan);
        out
    })?;
    ensure_finite("HT_TL", out)
}

fn trendline_tail(prices: &[f64]) -> Vec<f64> {
    let n = prices.len();
    let mut out = prices.to_vec();
    let mut trend = prices.to_vec();
    let mut disc = HilbertDiscriminator::new();

    for i in (WINDOW - 1)..n {
        let est = disc.update(&window_at(prices, i));
        let cycle = ((est.smooth_period + 0.5).floor() as usize).clamp(1, i + 1);
        trend[i] = prices[i + 1 - cycle..=i].iter().sum::<f64>() / cycle as f64;
        if i >= RAW_BARS {
            out[i] = 0.1
                * (4.0 * trend[i] + 3.0 * trend[i - 1] + 2.0 * trend[i - 2] + trend[i - 3]);
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct Trendline {
    params: TrendlineParams,
    source: PriceSource,
}

impl Trendline {
    pub fn new(params: TrendlineParams, source: PriceSource) -> Self {
        Self { params, source }
    }
}

impl Indicator for Trendline {
    fn name(&self) -> &str {
        "HT_TL"
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        self.params.prenan
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.source.extract(bars);
        let request = ReferenceRequest {
            function: "HT_TRENDLINE",
            inputs: vec![values.as_slice()],
            params: Vec::new(),
        };
        let out = caps.single_or(&request, || ht_trendline(&values, &self.params))?;
        Ok(vec![Column::float("HT_TL", Category::Overlap, out)])
    }
}
