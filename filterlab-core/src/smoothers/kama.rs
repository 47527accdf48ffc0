//! Kaufman Adaptive Moving Average (KAMA).
//!
//! ER = |p[i] - p[i-length]| / Σ|p[k] - p[k-drift]| over the last `length`
//! bars. The smoothing constant `sc = (ER·(fast_sc - slow_sc) + slow_sc)²`
//! slides between the fast and slow EMA constants. Seeded at index
//! `length - 1` with the SMA of the first `length` bars.

use crate::backend::{Capabilities, ReferenceRequest};
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, on_valid_tail, require_length};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KamaParams {
    pub length: usize,
    pub fast: usize,
    pub slow: usize,
    pub drift: usize,
}

impl Default for KamaParams {
    fn default() -> Self {
        Self {
            length: 10,
            fast: 2,
            slow: 30,
            drift: 1,
        }
    }
}

impl KamaParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), d.length);
        let fast = n.length("fast", raw.get("fast"), d.fast);
        let slow = n.length("slow", raw.get("slow"), d.slow);
        let drift = n.length("drift", raw.get("drift"), d.drift);
        n.finish(Self {
            length,
            fast,
            slow,
            drift,
        })
    }

    pub fn label(&self) -> String {
        format!("KAMA_{}_{}_{}", self.length, self.fast, self.slow)
    }
}

/// Compute KAMA over `values`.
pub fn kama(values: &[f64], params: &KamaParams) -> Result<Vec<f64>> {
    require_length("length", params.length)?;
    let out = on_valid_tail(values, params.length + 1, |tail| kama_tail(tail, params))?;
    ensure_finite("KAMA", out)
}

fn kama_tail(prices: &[f64], p: &KamaParams) -> Vec<f64> {
    let n = prices.len();
    let fast_sc = 2.0 / (p.fast as f64 + 1.0);
    let slow_sc = 2.0 / (p.slow as f64 + 1.0);

    // |p[k] - p[k-drift]|, zero where undefined
    let mut peer = vec![0.0; n];
    for k in p.drift..n {
        peer[k] = (prices[k] - prices[k - p.drift]).abs();
    }

    let mut out = vec![f64::NAN; n];
    let seed = prices[..p.length].iter().sum::<f64>() / p.length as f64;
    out[p.length - 1] = seed;

    let mut noise: f64 = peer[1..=p.length].iter().sum();
    let mut prev = seed;
    for i in p.length..n {
        if i > p.length {
            noise += peer[i] - peer[i - p.length];
        }
        let signal = (prices[i] - prices[i - p.length]).abs();
        let denom = if noise == 0.0 { f64::EPSILON } else { noise };
        let er = signal / denom;
        let sc = (er * (fast_sc - slow_sc) + slow_sc).powi(2);
        prev = sc * prices[i] + (1.0 - sc) * prev;
        out[i] = prev;
    }
    out
}

#[derive(Debug, Clone)]
pub struct Kama {
    params: KamaParams,
    source: PriceSource,
    name: String,
}

impl Kama {
    pub fn new(params: KamaParams, source: PriceSource) -> Self {
        Self {
            name: params.label(),
            params,
            source,
        }
    }
}

impl Indicator for Kama {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        self.params.length.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.source.extract(bars);
        let request = ReferenceRequest {
            function: "KAMA",
            inputs: vec![values.as_slice()],
            params: vec![self.params.length as f64],
        };
        let out = caps.single_or(&request, || kama(&values, &self.params))?;
        Ok(vec![Column::float(&self.name, Category::Overlap, out)])
    }
}
