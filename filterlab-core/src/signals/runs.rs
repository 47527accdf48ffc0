//! Long-run / short-run trend detectors over a fast and a slow series.
//!
//! A long run is a fast series rising while the slow one either falls
//! (bottoming) or rises too; a short run is the mirror image.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::verify_aligned;
use crate::smoothers::MovingAverage;

use super::monotonic::{decreasing, increasing};

/// `(inc(fast) & dec(slow)) | (inc(fast) & inc(slow))`.
pub fn long_run(fast: &[f64], slow: &[f64], length: usize) -> Result<Vec<bool>> {
    verify_aligned(fast.len(), &[slow])?;
    let fast_up = increasing(fast, length, false);
    let slow_up = increasing(slow, length, false);
    let slow_down = decreasing(slow, length, false);
    Ok((0..fast.len())
        .map(|i| (fast_up[i] && slow_down[i]) || (fast_up[i] && slow_up[i]))
        .collect())
}

/// `(dec(fast) & inc(slow)) | (dec(fast) & dec(slow))`.
pub fn short_run(fast: &[f64], slow: &[f64], length: usize) -> Result<Vec<bool>> {
    verify_aligned(fast.len(), &[slow])?;
    let fast_down = decreasing(fast, length, false);
    let slow_up = increasing(slow, length, false);
    let slow_down = decreasing(slow, length, false);
    Ok((0..fast.len())
        .map(|i| (fast_down[i] && slow_up[i]) || (fast_down[i] && slow_down[i]))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunsParams {
    /// Monotonicity window.
    pub length: usize,
    pub fast: MovingAverage,
    pub slow: MovingAverage,
}

impl Default for RunsParams {
    fn default() -> Self {
        Self {
            length: 2,
            fast: MovingAverage::Ema { length: 10 },
            slow: MovingAverage::Ema { length: 30 },
        }
    }
}

impl RunsParams {
    /// Keys `length`, `fast`, `slow` (smoother lengths) and `mamode`.
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), 2);
        let fast_len = n.length("fast", raw.get("fast"), 10);
        let slow_len = n.length("slow", raw.get("slow"), 30);
        let mamode = n.choice("mamode", raw.get("mamode"), "ema".to_string(), |name| {
            MovingAverage::from_name(name, 1).map(|_| name.to_ascii_lowercase())
        });
        let fast = MovingAverage::from_name(&mamode, fast_len)
            .unwrap_or(MovingAverage::Ema { length: fast_len });
        let slow = MovingAverage::from_name(&mamode, slow_len)
            .unwrap_or(MovingAverage::Ema { length: slow_len });
        n.finish(Self { length, fast, slow })
    }
}

/// `LR_{length}` and `SR_{length}` over smoothed fast and slow lines of one
/// price source.
#[derive(Debug, Clone)]
pub struct Runs {
    params: RunsParams,
    source: PriceSource,
    name: String,
}

impl Runs {
    pub fn new(params: RunsParams, source: PriceSource) -> Self {
        Self {
            name: format!("LR_{}", params.length),
            params,
            source,
        }
    }
}

impl Indicator for Runs {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Trend
    }

    fn lookback(&self) -> usize {
        self.params.fast.lookback().max(self.params.slow.lookback()) + self.params.length
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.source.extract(bars);
        let fast = self.params.fast.apply_with(&values, caps)?;
        let slow = self.params.slow.apply_with(&values, caps)?;
        let length = self.params.length;
        Ok(vec![
            Column::bool(&self.name, Category::Trend, long_run(&fast, &slow, length)?),
            Column::bool(
                format!("SR_{length}"),
                Category::Trend,
                short_run(&fast, &slow, length)?,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;
    use crate::testutil::{make_bars, walk};

    #[test]
    fn diverging_fast_and_slow() {
        let fast = [1.0, 2.0, 3.0, 4.0, 5.0];
        let slow = [5.0, 4.0, 3.0, 2.0, 1.0];
        let lr = long_run(&fast, &slow, 2).unwrap();
        assert_eq!(lr, vec![false, false, true, true, true]);
        let sr = short_run(&fast, &slow, 2).unwrap();
        assert!(sr.iter().all(|v| !v));
        // swapped roles
        let sr = short_run(&slow, &fast, 2).unwrap();
        assert_eq!(sr, vec![false, false, true, true, true]);
    }

    #[test]
    fn flat_slow_breaks_the_run() {
        let fast = [1.0, 2.0, 3.0, 4.0];
        let slow = [3.0; 4];
        assert!(long_run(&fast, &slow, 1).unwrap().iter().all(|v| !v));
    }

    #[test]
    fn misaligned_inputs_are_rejected() {
        let err = long_run(&[1.0, 2.0], &[1.0], 1).unwrap_err();
        assert!(matches!(err, IndicatorError::LengthMismatch { .. }));
    }

    #[test]
    fn runs_are_exclusive() {
        let bars = make_bars(&walk(200, 5));
        let cols = Runs::new(RunsParams::default(), PriceSource::Close)
            .compute(&bars, &Capabilities::native())
            .unwrap();
        assert_eq!(cols[0].name, "LR_2");
        assert_eq!(cols[1].name, "SR_2");
        let (crate::domain::ColumnValues::Bool(lr), crate::domain::ColumnValues::Bool(sr)) =
            (&cols[0].values, &cols[1].values)
        else {
            panic!("expected bool columns");
        };
        assert!(lr.iter().zip(sr).all(|(l, s)| !(*l && *s)));
    }

    #[test]
    fn mamode_applies_to_both_lines() {
        let mut raw = ParamMap::new();
        raw.insert("mamode".into(), "sma".into());
        raw.insert("fast".into(), 5i64.into());
        let p = RunsParams::normalize(&raw).params;
        assert_eq!(p.fast, MovingAverage::Sma { length: 5 });
        assert_eq!(p.slow, MovingAverage::Sma { length: 30 });
    }
}
