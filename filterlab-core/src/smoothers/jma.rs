//! Jurik Moving Average (JMA).
//!
//! Volatility-adaptive three-stage smoother: an adaptive EMA, a Kalman-like
//! phase correction, and a final Jurik adaptive stage. The smoothing factor is
//! recomputed every bar from the price's distance to a pair of adaptive bands
//! relative to the recent average of that distance.
//!
//! Bar 0 seeds every stage from the first price. The first `length - 1`
//! outputs are NaN.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, mask_prefix, on_valid_tail, require_length};

/// Bars in the running volatility sum.
const SUM_LENGTH: usize = 10;
/// Bars (beyond the current one) in the volatility-sum average.
const AVG_LENGTH: usize = 65;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JmaParams {
    pub length: usize,
    /// Phase in [-100, 100]; values outside saturate.
    pub phase: f64,
}

impl Default for JmaParams {
    fn default() -> Self {
        Self {
            length: 7,
            phase: 0.0,
        }
    }
}

impl JmaParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), d.length);
        let phase = n.finite("phase", raw.get("phase"), d.phase);
        n.finish(Self { length, phase })
    }

    pub fn label(&self) -> String {
        format!("JMA_{}_{}", self.length, self.phase)
    }
}

/// Per-length constants.
struct Coefficients {
    len1: f64,
    pow1: f64,
    bet: f64,
    beta: f64,
    pr: f64,
}

impl Coefficients {
    fn new(params: &JmaParams) -> Self {
        let half = 0.5 * (params.length as f64 - 1.0);
        let len1 = (half.sqrt().log2() + 2.0).max(0.0);
        let pow1 = (len1 - 2.0).max(0.5);
        let len2 = half.sqrt() * len1;
        let bet = len2 / (len2 + 1.0);
        let l = 0.45 * (params.length as f64 - 1.0);
        let beta = l / (l + 2.0);
        let pr = if params.phase < -100.0 {
            0.5
        } else if params.phase > 100.0 {
            2.5
        } else {
            1.5 + params.phase / 100.0
        };
        Self {
            len1,
            pow1,
            bet,
            beta,
            pr,
        }
    }
}

/// Compute JMA over `values`.
pub fn jma(values: &[f64], params: &JmaParams) -> Result<Vec<f64>> {
    require_length("length", params.length)?;
    let out = on_valid_tail(values, params.length, |tail| jma_tail(tail, params))?;
    ensure_finite("JMA", out)
}

fn jma_tail(prices: &[f64], params: &JmaParams) -> Vec<f64> {
    let n = prices.len();
    let c = Coefficients::new(params);
    let max_ratio = c.len1.powf(1.0 / c.pow1);

    let mut out = vec![0.0; n];
    let mut volty = vec![0.0; n];
    let mut v_sum = vec![0.0; n];

    out[0] = prices[0];
    let mut ma1 = prices[0];
    let mut upper = prices[0];
    let mut lower = prices[0];
    let mut det0 = 0.0;
    let mut det1 = 0.0;

    for i in 1..n {
        let price = prices[i];
        let del1 = price - upper;
        let del2 = price - lower;
        volty[i] = if del1.abs() != del2.abs() {
            del1.abs().max(del2.abs())
        } else {
            0.0
        };

        v_sum[i] = v_sum[i - 1] + (volty[i] - volty[i.saturating_sub(SUM_LENGTH)]) / SUM_LENGTH as f64;
        let window = &v_sum[i.saturating_sub(AVG_LENGTH)..=i];
        let avg_volty = window.iter().sum::<f64>() / window.len() as f64;
        let d_volty = if avg_volty == 0.0 {
            0.0
        } else {
            volty[i] / avg_volty
        };
        let r_volty = d_volty.min(max_ratio).max(1.0);

        let pow2 = r_volty.powf(c.pow1);
        let kv = c.bet.powf(pow2.sqrt());
        upper = if del1 > 0.0 { price } else { price - kv * del1 };
        lower = if del2 < 0.0 { price } else { price - kv * del2 };

        let alpha = c.beta.powf(pow2);
        ma1 = (1.0 - alpha) * price + alpha * ma1;
        det0 = (price - ma1) * (1.0 - c.beta) + c.beta * det0;
        let ma2 = ma1 + c.pr * det0;
        det1 = (ma2 - out[i - 1]) * (1.0 - alpha).powi(2) + alpha.powi(2) * det1;
        out[i] = out[i - 1] + det1;
    }

    mask_prefix(&mut out, params.length.saturating_sub(1));
    out
}

#[derive(Debug, Clone)]
pub struct Jma {
    params: JmaParams,
    source: PriceSource,
    name: String,
}

impl Jma {
    pub fn new(params: JmaParams, source: PriceSource) -> Self {
        Self {
            name: params.label(),
            params,
            source,
        }
    }
}

impl Indicator for Jma {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        self.params.length.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let values = jma(&self.source.extract(bars), &self.params)?;
        Ok(vec![Column::float(&self.name, Category::Overlap, values)])
    }
}
