//! Chandelier Exit.
//!
//! Raw stops hang `multiplier·ATR` below the highest high (long) and above
//! the lowest low (short) of their lookback windows. Each raw stop trails
//! its previous value while the previous close stays on the right side of
//! it. Direction turns long when the close clears the previous short stop
//! and short when it falls through the previous long stop; while direction
//! holds, the active stop never loosens.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, Ohlc};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{require_length, rolling_max, rolling_min, verify, verify_aligned};
use crate::volatility;

use super::{initial_direction, Direction, StopOutput};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChandelierParams {
    pub high_length: usize,
    pub low_length: usize,
    pub atr_length: usize,
    pub multiplier: f64,
    /// Take the extremes from closes instead of highs and lows.
    pub use_close: bool,
}

impl Default for ChandelierParams {
    fn default() -> Self {
        Self {
            high_length: 22,
            low_length: 22,
            atr_length: 22,
            multiplier: 2.0,
            use_close: false,
        }
    }
}

impl ChandelierParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let high_length = n.length("high_length", raw.get("high_length"), d.high_length);
        let low_length = n.length("low_length", raw.get("low_length"), d.low_length);
        let atr_length = n.length("atr_length", raw.get("atr_length"), d.atr_length);
        let multiplier = n.positive("multiplier", raw.get("multiplier"), d.multiplier);
        let use_close = n.flag("use_close", raw.get("use_close"), d.use_close);
        n.finish(Self {
            high_length,
            low_length,
            atr_length,
            multiplier,
            use_close,
        })
    }

    fn suffix(&self) -> String {
        format!(
            "_{}_{}_{}_{:?}",
            self.high_length, self.low_length, self.atr_length, self.multiplier
        )
    }

    /// First bar with every input defined.
    pub fn warmup(&self) -> usize {
        self.high_length
            .saturating_sub(1)
            .max(self.low_length.saturating_sub(1))
            .max(self.atr_length)
    }
}

/// Compute the Chandelier Exit from aligned high/low/close and an ATR series.
pub fn chandelier_exit(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    atr: &[f64],
    params: &ChandelierParams,
) -> Result<StopOutput> {
    require_length("high_length", params.high_length)?;
    require_length("low_length", params.low_length)?;
    let n = close.len();
    verify_aligned(n, &[high, low, atr])?;
    verify(atr, 1)?;

    let (hi_src, lo_src) = if params.use_close {
        (close, close)
    } else {
        (high, low)
    };
    let highest = rolling_max(hi_src, params.high_length);
    let lowest = rolling_min(lo_src, params.low_length);

    let mut out = StopOutput::new(n);
    let mut direction = initial_direction(high, low);
    let mut prev: Option<(f64, f64)> = None;

    for i in 0..n {
        let long0 = highest[i] - params.multiplier * atr[i];
        let short0 = lowest[i] + params.multiplier * atr[i];
        if long0.is_nan() || short0.is_nan() {
            continue;
        }

        let (mut long, mut short) = (long0, short0);
        if let Some((long_prev, short_prev)) = prev {
            if close[i - 1] > long_prev {
                long = long.max(long_prev);
            }
            if close[i - 1] < short_prev {
                short = short.min(short_prev);
            }

            let held = direction;
            if close[i] > short_prev {
                direction = Direction::Long;
            } else if close[i] < long_prev {
                direction = Direction::Short;
            }
            if direction == held {
                match direction {
                    Direction::Long => long = long.max(long_prev),
                    Direction::Short => short = short.min(short_prev),
                }
            }
        }

        prev = Some((long, short));
        let level = match direction {
            Direction::Long => long,
            Direction::Short => short,
        };
        out.set(i, direction, level);
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct Chandelier {
    params: ChandelierParams,
    name: String,
}

impl Chandelier {
    pub fn new(params: ChandelierParams) -> Self {
        Self {
            name: format!("CHDLREXTl{}", params.suffix()),
            params,
        }
    }
}

impl Indicator for Chandelier {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Volatility
    }

    fn lookback(&self) -> usize {
        self.params.warmup()
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let ohlc = Ohlc::from_bars(bars);
        let atr = volatility::atr(&ohlc.high, &ohlc.low, &ohlc.close, self.params.atr_length)?;
        let out = chandelier_exit(&ohlc.high, &ohlc.low, &ohlc.close, &atr, &self.params)?;
        Ok(out.into_columns(
            ["CHDLREXTl", "CHDLREXTs", "CHDLREXTd"],
            &self.params.suffix(),
            Category::Volatility,
        ))
    }
}
