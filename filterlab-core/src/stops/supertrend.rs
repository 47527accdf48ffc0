//! Supertrend.
//!
//! Bands at `hl2 ± multiplier·ATR`. The close breaking above the previous
//! upper band turns the trend long; breaking below the previous lower band
//! turns it short. While the direction holds, the active band is ratcheted:
//! the lower band never falls during a long trend and the upper band never
//! rises during a short one.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, Ohlc};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{verify, verify_aligned};
use crate::volatility;

use super::{initial_direction, Direction, StopOutput};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupertrendParams {
    /// ATR length.
    pub length: usize,
    pub multiplier: f64,
}

impl Default for SupertrendParams {
    fn default() -> Self {
        Self {
            length: 7,
            multiplier: 3.0,
        }
    }
}

impl SupertrendParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), d.length);
        let multiplier = n.positive("multiplier", raw.get("multiplier"), d.multiplier);
        n.finish(Self { length, multiplier })
    }

    fn suffix(&self) -> String {
        format!("_{}_{:?}", self.length, self.multiplier)
    }
}

/// Compute Supertrend from aligned high/low/close and an ATR series.
pub fn supertrend(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    atr: &[f64],
    params: &SupertrendParams,
) -> Result<StopOutput> {
    let n = close.len();
    verify_aligned(n, &[high, low, atr])?;
    verify(atr, 1)?;

    let mut upper: Vec<f64> = (0..n)
        .map(|i| (high[i] + low[i]) / 2.0 + params.multiplier * atr[i])
        .collect();
    let mut lower: Vec<f64> = (0..n)
        .map(|i| (high[i] + low[i]) / 2.0 - params.multiplier * atr[i])
        .collect();

    let mut out = StopOutput::new(n);
    let mut direction = initial_direction(high, low);
    for i in 0..n {
        if i > 0 {
            let prev = direction;
            if close[i] > upper[i - 1] {
                direction = Direction::Long;
            } else if close[i] < lower[i - 1] {
                direction = Direction::Short;
            }
            if direction == prev {
                match direction {
                    Direction::Long if lower[i] < lower[i - 1] => lower[i] = lower[i - 1],
                    Direction::Short if upper[i] > upper[i - 1] => upper[i] = upper[i - 1],
                    _ => {}
                }
            }
        }
        let level = match direction {
            Direction::Long => lower[i],
            Direction::Short => upper[i],
        };
        if !level.is_nan() {
            out.set(i, direction, level);
        }
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    params: SupertrendParams,
    name: String,
}

impl Supertrend {
    pub fn new(params: SupertrendParams) -> Self {
        Self {
            name: format!("SUPERT{}", params.suffix()),
            params,
        }
    }
}

impl Indicator for Supertrend {
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
        let ohlc = Ohlc::from_bars(bars);
        let atr = volatility::atr(&ohlc.high, &ohlc.low, &ohlc.close, self.params.length)?;
        let out = supertrend(&ohlc.high, &ohlc.low, &ohlc.close, &atr, &self.params)?;
        let suffix = self.params.suffix();
        let trend = out.active();
        let direction = out.direction_values();
        Ok(vec![
            Column::float(&self.name, Category::Overlap, trend),
            Column::float(format!("SUPERTd{suffix}"), Category::Overlap, direction),
            Column::float(format!("SUPERTl{suffix}"), Category::Overlap, out.long),
            Column::float(format!("SUPERTs{suffix}"), Category::Overlap, out.short),
        ])
    }
}
