//! ATR Trailing Stop.
//!
//! The stop trails the close by `loss = multiplier·ATR`: `max(prev, close -
//! loss)` while long, `min(prev, close + loss)` while short. A close through
//! the stop reverses and reseeds at `close ∓ loss`.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, Ohlc};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{verify, verify_aligned};
use crate::volatility;

use super::{initial_direction, Direction, Ratchet, StopOutput};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtrTrailingParams {
    /// ATR length.
    pub length: usize,
    pub multiplier: f64,
}

impl Default for AtrTrailingParams {
    fn default() -> Self {
        Self {
            length: 14,
            multiplier: 3.0,
        }
    }
}

impl AtrTrailingParams {
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

/// Compute the trailing stop from closes and an aligned ATR series.
///
/// The starting side comes from the first two closes (short if the close
/// fell, long otherwise).
pub fn atr_trailing_stop(
    close: &[f64],
    atr: &[f64],
    params: &AtrTrailingParams,
) -> Result<StopOutput> {
    let n = close.len();
    verify_aligned(n, &[atr])?;
    verify(atr, 1)?;

    let mut out = StopOutput::new(n);
    let mut ratchet: Option<Ratchet> = None;
    let start = initial_direction(close, close);

    for i in 0..n {
        let loss = params.multiplier * atr[i];
        if loss.is_nan() || close[i].is_nan() {
            continue;
        }
        let long_level = close[i] - loss;
        let short_level = close[i] + loss;

        match ratchet.as_mut() {
            None => {
                let level = match start {
                    Direction::Long => long_level,
                    Direction::Short => short_level,
                };
                ratchet = Some(Ratchet::new(start, level));
            }
            Some(r) => {
                let breached = match r.direction() {
                    Direction::Long => close[i] < r.level(),
                    Direction::Short => close[i] > r.level(),
                };
                if breached {
                    let reseed = match r.direction().flip() {
                        Direction::Long => long_level,
                        Direction::Short => short_level,
                    };
                    r.reverse(reseed);
                } else {
                    match r.direction() {
                        Direction::Long => r.apply(long_level),
                        Direction::Short => r.apply(short_level),
                    };
                }
            }
        }
        if let Some(r) = ratchet {
            out.set(i, r.direction(), r.level());
        }
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct AtrTrailing {
    params: AtrTrailingParams,
    name: String,
}

impl AtrTrailing {
    pub fn new(params: AtrTrailingParams) -> Self {
        Self {
            name: format!("ATRTSl{}", params.suffix()),
            params,
        }
    }
}

impl Indicator for AtrTrailing {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Volatility
    }

    fn lookback(&self) -> usize {
        self.params.length
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let ohlc = Ohlc::from_bars(bars);
        let atr = volatility::atr(&ohlc.high, &ohlc.low, &ohlc.close, self.params.length)?;
        let out = atr_trailing_stop(&ohlc.close, &atr, &self.params)?;
        Ok(out.into_columns(
            ["ATRTSl", "ATRTSs", "ATRTSd"],
            &self.params.suffix(),
            Category::Volatility,
        ))
    }
}
