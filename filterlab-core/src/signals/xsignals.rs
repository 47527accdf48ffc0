//! Cross signals: trend signals from threshold crossings.
//!
//! An entry crossing and an exit crossing are detected against two
//! thresholds. The trend holds from the last event until the next one, so a
//! repeated crossing of the same kind changes nothing.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{verify, verify_aligned};

use super::tsignals::{TrendSignals, TsignalsParams};

/// A crossing threshold: a fixed level or a series aligned with the signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold<'a> {
    Level(f64),
    Series(&'a [f64]),
}

impl Threshold<'_> {
    fn at(&self, i: usize) -> f64 {
        match self {
            Threshold::Level(v) => *v,
            Threshold::Series(s) => s[i],
        }
    }
}

/// `signal` crosses above (`above`) or below `threshold` at each bar.
/// Crossing above is `prev < t_prev && cur > t`.
pub fn crosses(signal: &[f64], threshold: Threshold<'_>, above: bool) -> Vec<bool> {
    (0..signal.len())
        .map(|i| {
            if i == 0 {
                return false;
            }
            let (prev, cur) = (signal[i - 1], signal[i]);
            let (t_prev, t) = (threshold.at(i - 1), threshold.at(i));
            if above {
                prev < t_prev && cur > t
            } else {
                prev > t_prev && cur < t
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XsignalsParams {
    /// Enter on crossing above `xa` and exit on crossing below `xb`; when
    /// false, enter below `xa` and exit above `xb`.
    pub above: bool,
    /// Trend on after an entry. When false the trend is inverted, so it is
    /// also on before the first crossing.
    pub long: bool,
    pub signals: TsignalsParams,
}

impl Default for XsignalsParams {
    fn default() -> Self {
        Self {
            above: true,
            long: true,
            signals: TsignalsParams::default(),
        }
    }
}

impl XsignalsParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let mut n = Normalizer::new();
        let above = n.flag("above", raw.get("above"), true);
        let long = n.flag("long", raw.get("long"), true);
        let mut norm = n.finish(Self {
            above,
            long,
            signals: TsignalsParams::default(),
        });
        let signals = norm.absorb(TsignalsParams::normalize(raw));
        norm.params.signals = signals;
        norm
    }
}

/// Compute cross signals for `signal` against `xa` (entries) and `xb`
/// (exits).
pub fn xsignals(
    signal: &[f64],
    xa: Threshold<'_>,
    xb: Threshold<'_>,
    params: &XsignalsParams,
) -> Result<TrendSignals> {
    let n = signal.len();
    verify(signal, 1)?;
    for threshold in [xa, xb] {
        if let Threshold::Series(s) = threshold {
            verify_aligned(n, &[s])?;
        }
    }

    let entries = crosses(signal, xa, params.above);
    let exits = crosses(signal, xb, !params.above);

    let mut last = 0i64;
    let trends = (0..n)
        .map(|i| {
            let event = i64::from(entries[i]) - i64::from(exits[i]);
            if event != 0 {
                last = event;
            }
            let on = last > 0;
            if params.long {
                on
            } else {
                !on
            }
        })
        .collect();
    Ok(TrendSignals::from_trends(trends, params.signals.trade_offset))
}

/// Fixed entry and exit levels for [`Xsignals`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossLevels {
    pub xa: f64,
    pub xb: f64,
}

impl Default for CrossLevels {
    fn default() -> Self {
        Self { xa: 20.0, xb: 80.0 }
    }
}

impl CrossLevels {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let xa = n.finite("xa", raw.get("xa"), d.xa);
        let xb = n.finite("xb", raw.get("xb"), d.xb);
        n.finish(Self { xa, xb })
    }
}

/// Cross signals of a price source against two fixed levels.
#[derive(Debug, Clone)]
pub struct Xsignals {
    levels: CrossLevels,
    params: XsignalsParams,
    source: PriceSource,
    name: String,
}

impl Xsignals {
    pub fn new(levels: CrossLevels, params: XsignalsParams, source: PriceSource) -> Self {
        Self {
            name: "TS_Trends".to_string(),
            levels,
            params,
            source,
        }
    }
}

impl Indicator for Xsignals {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Trend
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let signal = self.source.extract(bars);
        let out = xsignals(
            &signal,
            Threshold::Level(self.levels.xa),
            Threshold::Level(self.levels.xb),
            &self.params,
        )?;
        Ok(out.into_columns(self.params.signals.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNAL: [f64; 10] = [10.0, 15.0, 25.0, 50.0, 85.0, 90.0, 70.0, 60.0, 30.0, 10.0];

    fn count(flags: &[bool]) -> usize {
        flags.iter().filter(|f| **f).count()
    }

    #[test]
    fn enter_above_exit_below() {
        let s = xsignals(
            &SIGNAL,
            Threshold::Level(20.0),
            Threshold::Level(80.0),
            &XsignalsParams::default(),
        )
        .unwrap();
        assert_eq!(count(&s.entries), 1);
        assert!(s.entries[2]);
        assert_eq!(count(&s.exits), 1);
        assert!(s.exits[6]);
        assert!(s.trends[2..6].iter().all(|t| *t));
        assert!(!s.trends[1] && !s.trends[6]);
    }

    #[test]
    fn repeated_crossings_are_idempotent() {
        let signal = [10.0, 25.0, 15.0, 25.0, 90.0, 70.0];
        let s = xsignals(
            &signal,
            Threshold::Level(20.0),
            Threshold::Level(80.0),
            &XsignalsParams::default(),
        )
        .unwrap();
        // the second upward crossing of 20 at bar 3 is not a new entry
        assert_eq!(s.trades, vec![0, 1, 0, 0, 0, -1]);
    }

    #[test]
    fn short_trend_follows_exits() {
        let p = XsignalsParams {
            long: false,
            ..Default::default()
        };
        let s = xsignals(&SIGNAL, Threshold::Level(20.0), Threshold::Level(80.0), &p).unwrap();
        // short trend is the inverse of the long one, leading gap included
        assert_eq!(
            s.trends,
            vec![true, true, false, false, false, false, true, true, true, true]
        );
        assert_eq!(s.trades, vec![0, 0, -1, 0, 0, 0, 1, 0, 0, 0]);
        assert!(s.exits[2] && s.entries[6]);
    }

    #[test]
    fn short_trend_is_on_before_any_crossing() {
        let p = XsignalsParams {
            long: false,
            ..Default::default()
        };
        let s = xsignals(
            &[50.0, 55.0, 60.0],
            Threshold::Level(20.0),
            Threshold::Level(80.0),
            &p,
        )
        .unwrap();
        assert!(s.trends.iter().all(|t| *t));
        assert!(s.trades.iter().all(|t| *t == 0));
    }

    #[test]
    fn below_reverses_both_crossings() {
        let p = XsignalsParams {
            above: false,
            ..Default::default()
        };
        let s = xsignals(&SIGNAL, Threshold::Level(80.0), Threshold::Level(20.0), &p).unwrap();
        // enter on falling through 80 (bar 6), exit on rising through 20 (bar 2)
        assert!(s.trends[6..].iter().all(|t| *t));
        assert!(s.trends[..6].iter().all(|t| !t));
    }

    #[test]
    fn series_threshold() {
        let signal = [1.0, 3.0, 2.0];
        let line = [2.0, 2.0, 2.5];
        let up = crosses(&signal, Threshold::Series(&line), true);
        assert_eq!(up, vec![false, true, false]);
        let down = crosses(&signal, Threshold::Series(&line), false);
        assert_eq!(down, vec![false, false, true]);
    }

    #[test]
    fn touching_is_not_crossing() {
        let signal = [19.0, 20.0, 21.0];
        let up = crosses(&signal, Threshold::Level(20.0), true);
        assert_eq!(up, vec![false, false, false]);
    }

    #[test]
    fn misaligned_threshold_is_rejected() {
        let err = xsignals(
            &SIGNAL,
            Threshold::Series(&[1.0, 2.0]),
            Threshold::Level(80.0),
            &XsignalsParams::default(),
        );
        assert!(err.is_err());
    }
}
