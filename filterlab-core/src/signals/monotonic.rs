//! Rolling monotonicity predicates.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};

/// Which way a series must move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Rising,
    Falling,
}

impl Slope {
    fn holds(self, from: f64, to: f64) -> bool {
        match self {
            Slope::Rising => to - from > 0.0,
            Slope::Falling => to - from < 0.0,
        }
    }
}

/// Per-bar test of `values` moving in `slope` over the last `length` bars.
///
/// Non-strict compares `x[i]` with `x[i-length]`; strict requires every step
/// inside the window to move that way. Bars without a full window, and any
/// comparison touching NaN, are `false`.
pub fn monotonic(values: &[f64], length: usize, strict: bool, slope: Slope) -> Vec<bool> {
    let length = length.max(1);
    (0..values.len())
        .map(|i| {
            if i < length {
                return false;
            }
            if strict {
                (i + 1 - length..=i).all(|k| slope.holds(values[k - 1], values[k]))
            } else {
                slope.holds(values[i - length], values[i])
            }
        })
        .collect()
}

pub fn increasing(values: &[f64], length: usize, strict: bool) -> Vec<bool> {
    monotonic(values, length, strict, Slope::Rising)
}

pub fn decreasing(values: &[f64], length: usize, strict: bool) -> Vec<bool> {
    monotonic(values, length, strict, Slope::Falling)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonotonicParams {
    pub length: usize,
    pub strict: bool,
}

impl Default for MonotonicParams {
    fn default() -> Self {
        Self {
            length: 1,
            strict: false,
        }
    }
}

impl MonotonicParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), d.length);
        let strict = n.flag("strict", raw.get("strict"), d.strict);
        n.finish(Self { length, strict })
    }
}

/// `INC_{length}` / `DEC_{length}` (prefixed `S` when strict).
#[derive(Debug, Clone)]
pub struct Monotonic {
    params: MonotonicParams,
    slope: Slope,
    source: PriceSource,
    name: String,
}

impl Monotonic {
    pub fn new(params: MonotonicParams, slope: Slope, source: PriceSource) -> Self {
        let tag = match slope {
            Slope::Rising => "INC",
            Slope::Falling => "DEC",
        };
        let strict = if params.strict { "S" } else { "" };
        Self {
            name: format!("{strict}{tag}_{}", params.length),
            params,
            slope,
            source,
        }
    }
}

impl Indicator for Monotonic {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Trend
    }

    fn lookback(&self) -> usize {
        self.params.length
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.source.extract(bars);
        let flags = monotonic(&values, self.params.length, self.params.strict, self.slope);
        Ok(vec![Column::bool(&self.name, Category::Trend, flags)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_strict_compares_window_ends() {
        let x = [1.0, 3.0, 2.0, 4.0];
        assert_eq!(increasing(&x, 2, false), vec![false, false, true, true]);
        assert_eq!(decreasing(&x, 1, false), vec![false, false, true, false]);
    }

    #[test]
    fn strict_checks_every_step() {
        let x = [1.0, 3.0, 2.0, 4.0, 5.0];
        assert_eq!(increasing(&x, 2, true), vec![false, false, false, false, true]);
    }

    #[test]
    fn nan_is_never_monotonic() {
        let x = [1.0, f64::NAN, 3.0, 4.0];
        assert_eq!(increasing(&x, 1, false), vec![false, false, false, true]);
        assert_eq!(increasing(&x, 2, true), vec![false, false, false, false]);
    }

    #[test]
    fn flat_is_neither() {
        let x = [2.0; 5];
        assert!(increasing(&x, 1, false).iter().all(|v| !v));
        assert!(decreasing(&x, 1, false).iter().all(|v| !v));
    }

    #[test]
    fn names() {
        let strict = MonotonicParams {
            length: 3,
            strict: true,
        };
        assert_eq!(
            Monotonic::new(strict, Slope::Rising, PriceSource::Close).name(),
            "SINC_3"
        );
        assert_eq!(
            Monotonic::new(MonotonicParams::default(), Slope::Falling, PriceSource::Close).name(),
            "DEC_1"
        );
    }
}
