//! Variable Index Dynamic Average (VIDYA).
//!
//! An EMA whose alpha is scaled by the absolute Chande Momentum Oscillator:
//! `v[i] = α·|CMO|·p[i] + (1 - α·|CMO|)·v[i-1]`, `α = 2 / (length + 1)`.
//!
//! The recursion state starts at zero at index `length - 1`. Any output that
//! is exactly zero is reported as missing, so the warm-up prefix and bars
//! where no momentum has built up yet are both NaN.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, on_valid_tail, require_length};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VidyaParams {
    pub length: usize,
    pub drift: usize,
}

impl Default for VidyaParams {
    fn default() -> Self {
        Self {
            length: 14,
            drift: 1,
        }
    }
}

impl VidyaParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), d.length);
        let drift = n.length("drift", raw.get("drift"), d.drift);
        n.finish(Self { length, drift })
    }

    pub fn label(&self) -> String {
        format!("VIDYA_{}", self.length)
    }
}

/// Compute VIDYA over `values`.
pub fn vidya(values: &[f64], params: &VidyaParams) -> Result<Vec<f64>> {
    require_length("length", params.length)?;
    let out = on_valid_tail(values, params.length + 1, |tail| vidya_tail(tail, params))?;
    ensure_finite("VIDYA", out)
}

fn vidya_tail(prices: &[f64], p: &VidyaParams) -> Vec<f64> {
    let n = prices.len();
    let alpha = 2.0 / (p.length as f64 + 1.0);

    let mut up = vec![0.0; n];
    let mut down = vec![0.0; n];
    for k in p.drift..n {
        let mom = prices[k] - prices[k - p.drift];
        up[k] = mom.max(0.0);
        down[k] = (-mom).max(0.0);
    }

    let mut out = vec![f64::NAN; n];
    let mut up_sum: f64 = up[1..p.length].iter().sum();
    let mut down_sum: f64 = down[1..p.length].iter().sum();
    let mut prev = 0.0;
    for i in p.length..n {
        up_sum += up[i];
        down_sum += down[i];
        if i > p.length {
            up_sum -= up[i - p.length];
            down_sum -= down[i - p.length];
        }
        let total = up_sum + down_sum;
        let cmo = if total == 0.0 {
            0.0
        } else {
            ((up_sum - down_sum) / total).abs()
        };
        prev = alpha * cmo * prices[i] + (1.0 - alpha * cmo) * prev;
        out[i] = if prev == 0.0 { f64::NAN } else { prev };
    }
    out
}

#[derive(Debug, Clone)]
pub struct Vidya {
    params: VidyaParams,
    source: PriceSource,
    name: String,
}

impl Vidya {
    pub fn new(params: VidyaParams, source: PriceSource) -> Self {
        Self {
            name: params.label(),
            params,
            source,
        }
    }
}

impl Indicator for Vidya {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        self.params.length
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let values = vidya(&self.source.extract(bars), &self.params)?;
        Ok(vec![Column::float(&self.name, Category::Overlap, values)])
    }
}
