//! Parabolic Stop and Reverse (PSAR).
//!
//! SAR' = SAR + af·(EP - SAR). The acceleration factor grows by `af_step`
//! (capped at `max_af`) each bar the extreme point (EP) makes a new high
//! (long) or low (short). SAR' may not enter the previous two bars' range.
//! A bar whose low (long) or high (short) crosses the candidate SAR reverses:
//! SAR jumps to EP, af resets to `af0` and EP is reseeded from the bar.

use crate::backend::{Capabilities, ReferenceRequest};
use crate::domain::{Bar, Category, Column, Ohlc};
use crate::error::{IndicatorError, Result};
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{first_valid, verify, verify_aligned};

use super::{initial_direction, Direction, Ratchet, StopOutput};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsarParams {
    pub af0: f64,
    pub af_step: f64,
    pub max_af: f64,
}

impl Default for PsarParams {
    fn default() -> Self {
        Self {
            af0: 0.02,
            af_step: 0.02,
            max_af: 0.2,
        }
    }
}

impl PsarParams {
    /// Keys `af0`, `af` (step, defaults to `af0`) and `max_af`.
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let af0 = n.positive("af0", raw.get("af0"), d.af0);
        let af_step = n.positive("af", raw.get("af"), af0);
        let max_af = n.positive("max_af", raw.get("max_af"), d.max_af);
        n.finish(Self {
            af0,
            af_step,
            max_af,
        })
    }

    fn suffix(&self) -> String {
        format!("_{}_{}", self.af0, self.max_af)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PsarOutput {
    pub stops: StopOutput,
    /// Acceleration factor in force after each bar.
    pub af: Vec<f64>,
    /// True on the bar a reversal happened.
    pub reversal: Vec<bool>,
}

/// Compute PSAR. The first bar where both high and low are valid only seeds
/// the state and carries no SAR; bars before it stay empty.
///
/// The initial SAR is the seed bar's close when a close series is supplied
/// and finite there, otherwise its low (long) or high (short).
pub fn psar(
    high: &[f64],
    low: &[f64],
    close: Option<&[f64]>,
    params: &PsarParams,
) -> Result<PsarOutput> {
    let n = high.len();
    verify_aligned(n, &[low])?;
    if let Some(close) = close {
        verify_aligned(n, &[close])?;
    }
    verify(high, 2)?;
    verify(low, 2)?;
    let start = first_valid(high).max(first_valid(low)).unwrap_or(n);
    if n - start < 2 {
        return Err(IndicatorError::InsufficientData {
            required: 2,
            got: n - start,
        });
    }

    let mut direction = initial_direction(&high[start..], &low[start..]);
    let (mut sar, mut ep) = match direction {
        Direction::Long => (low[start], high[start]),
        Direction::Short => (high[start], low[start]),
    };
    if let Some(seed) = close.map(|c| c[start]).filter(|c| c.is_finite()) {
        sar = seed;
    }
    let mut af = params.af0;

    let mut out = PsarOutput {
        stops: StopOutput::new(n),
        af: vec![f64::NAN; n],
        reversal: vec![false; n],
    };
    out.af[start] = af;

    let mut ratchet = Ratchet::new(direction, f64::NAN);
    for i in start + 1..n {
        let (h, l) = (high[i], low[i]);
        let prior = i.saturating_sub(2).max(start);
        let candidate = sar + af * (ep - sar);

        let reverse = match direction {
            Direction::Long => {
                if h > ep {
                    ep = h;
                    af = (af + params.af_step).min(params.max_af);
                }
                l < candidate
            }
            Direction::Short => {
                if l < ep {
                    ep = l;
                    af = (af + params.af_step).min(params.max_af);
                }
                h > candidate
            }
        };

        if reverse {
            sar = ep;
            af = params.af0;
            direction = direction.flip();
            ep = match direction {
                Direction::Long => h,
                Direction::Short => l,
            };
            ratchet.reverse(sar);
        } else {
            let bounded = match direction {
                Direction::Long => candidate.min(low[i - 1]).min(low[prior]),
                Direction::Short => candidate.max(high[i - 1]).max(high[prior]),
            };
            sar = ratchet.apply(bounded);
        }

        out.stops.set(i, direction, sar);
        out.af[i] = af;
        out.reversal[i] = reverse;
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct Psar {
    params: PsarParams,
    name: String,
}

impl Psar {
    pub fn new(params: PsarParams) -> Self {
        Self {
            name: format!("PSARl{}", params.suffix()),
            params,
        }
    }
}

impl Indicator for Psar {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Trend
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let ohlc = Ohlc::from_bars(bars);
        let suffix = self.params.suffix();
        let request = ReferenceRequest {
            function: "SAR",
            inputs: vec![ohlc.high.as_slice(), ohlc.low.as_slice()],
            params: vec![self.params.af0, self.params.max_af],
        };
        if let Some(mut series) = caps.substitute(&request, 1) {
            // The reference SAR is a single series; split it by side.
            let sar = series.pop().unwrap_or_default();
            let mut long = vec![f64::NAN; sar.len()];
            let mut short = vec![f64::NAN; sar.len()];
            for i in 0..sar.len() {
                if sar[i] <= ohlc.low[i] {
                    long[i] = sar[i];
                } else if sar[i] >= ohlc.high[i] {
                    short[i] = sar[i];
                }
            }
            return Ok(vec![
                Column::float(format!("PSARl{suffix}"), Category::Trend, long),
                Column::float(format!("PSARs{suffix}"), Category::Trend, short),
            ]);
        }

        let out = psar(&ohlc.high, &ohlc.low, Some(ohlc.close.as_slice()), &self.params)?;
        let reversal = out.reversal.iter().map(|&r| i64::from(r)).collect();
        Ok(vec![
            Column::float(format!("PSARl{suffix}"), Category::Trend, out.stops.long),
            Column::float(format!("PSARs{suffix}"), Category::Trend, out.stops.short),
            Column::float(format!("PSARaf{suffix}"), Category::Trend, out.af),
            Column::int(format!("PSARr{suffix}"), Category::Trend, reversal),
        ])
    }
}
