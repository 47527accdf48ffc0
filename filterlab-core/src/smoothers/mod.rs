//! Moving averages and adaptive smoothers.
//!
//! Every smoother is a pure function `(&[f64], &Params) -> Result<Vec<f64>>`.
//! [`MovingAverage`] is the closed set of smoothers that other indicators
//! can be parameterized with (ZLMA's inner filter, signal lines).

pub mod basic;
pub mod hwma;
pub mod jma;
pub mod kama;
pub mod mama;
pub mod vidya;
pub mod zlma;

use std::fmt;

use crate::backend::{Capabilities, ReferenceRequest};
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::filters::{ht_trendline, ssf, ssf3, Ssf3Params, SsfParams, TrendlineParams};
use crate::indicator::Indicator;

pub use hwma::{hwma, Hwma, HwmaParams};
pub use jma::{jma, Jma, JmaParams};
pub use kama::{kama, Kama, KamaParams};
pub use mama::{mama, Mama, MamaOutput, MamaParams};
pub use vidya::{vidya, Vidya, VidyaParams};
pub use zlma::{zlma, Zlma, ZlmaParams};

/// A smoother together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovingAverage {
    Sma { length: usize },
    Ema { length: usize },
    Rma { length: usize },
    Dema { length: usize },
    Tema { length: usize },
    Jma(JmaParams),
    Kama(KamaParams),
    Vidya(VidyaParams),
    Hwma(HwmaParams),
    /// The MAMA line of MAMA/FAMA.
    Mama(MamaParams),
    Ssf(SsfParams),
    Ssf3(Ssf3Params),
    Trendline(TrendlineParams),
}

impl Default for MovingAverage {
    fn default() -> Self {
        MovingAverage::Ema { length: 10 }
    }
}

impl MovingAverage {
    /// Build a smoother from its conventional short name, using `length`
    /// where the smoother has one and defaults for everything else.
    pub fn from_name(name: &str, length: usize) -> Option<Self> {
        let ma = match name.to_ascii_lowercase().as_str() {
            "sma" => MovingAverage::Sma { length },
            "ema" => MovingAverage::Ema { length },
            "rma" => MovingAverage::Rma { length },
            "dema" => MovingAverage::Dema { length },
            "tema" => MovingAverage::Tema { length },
            "jma" => MovingAverage::Jma(JmaParams {
                length,
                ..Default::default()
            }),
            "kama" => MovingAverage::Kama(KamaParams {
                length,
                ..Default::default()
            }),
            "vidya" => MovingAverage::Vidya(VidyaParams {
                length,
                ..Default::default()
            }),
            "hwma" => MovingAverage::Hwma(HwmaParams::default()),
            "mama" => MovingAverage::Mama(MamaParams::default()),
            "ssf" => MovingAverage::Ssf(SsfParams {
                length,
                ..Default::default()
            }),
            "ssf3" => MovingAverage::Ssf3(Ssf3Params {
                length,
                ..Default::default()
            }),
            "ht_trendline" | "trendline" => MovingAverage::Trendline(TrendlineParams::default()),
            _ => return None,
        };
        Some(ma)
    }

    /// Short upper-case tag used in column names.
    pub fn label(&self) -> &'static str {
        match self {
            MovingAverage::Sma { .. } => "SMA",
            MovingAverage::Ema { .. } => "EMA",
            MovingAverage::Rma { .. } => "RMA",
            MovingAverage::Dema { .. } => "DEMA",
            MovingAverage::Tema { .. } => "TEMA",
            MovingAverage::Jma(_) => "JMA",
            MovingAverage::Kama(_) => "KAMA",
            MovingAverage::Vidya(_) => "VIDYA",
            MovingAverage::Hwma(_) => "HWMA",
            MovingAverage::Mama(_) => "MAMA",
            MovingAverage::Ssf(_) => "SSF",
            MovingAverage::Ssf3(_) => "SSF3",
            MovingAverage::Trendline(_) => "HT_TL",
        }
    }

    /// Run the smoother.
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>> {
        match self {
            MovingAverage::Sma { length } => basic::sma(values, *length),
            MovingAverage::Ema { length } => basic::ema(values, *length),
            MovingAverage::Rma { length } => basic::rma(values, *length),
            MovingAverage::Dema { length } => basic::dema(values, *length),
            MovingAverage::Tema { length } => basic::tema(values, *length),
            MovingAverage::Jma(p) => jma(values, p),
            MovingAverage::Kama(p) => kama(values, p),
            MovingAverage::Vidya(p) => vidya(values, p),
            MovingAverage::Hwma(p) => hwma(values, p),
            MovingAverage::Mama(p) => mama(values, p).map(|out| out.mama),
            MovingAverage::Ssf(p) => ssf(values, p),
            MovingAverage::Ssf3(p) => ssf3(values, p),
            MovingAverage::Trendline(p) => ht_trendline(values, p),
        }
    }

    /// Run the smoother, letting an installed reference backend answer for
    /// the fixed-alpha averages.
    pub fn apply_with(&self, values: &[f64], caps: &Capabilities) -> Result<Vec<f64>> {
        let function = match self {
            MovingAverage::Sma { .. } => "SMA",
            MovingAverage::Ema { .. } => "EMA",
            MovingAverage::Dema { .. } => "DEMA",
            MovingAverage::Tema { .. } => "TEMA",
            _ => return self.apply(values),
        };
        let request = ReferenceRequest {
            function,
            inputs: vec![values],
            params: vec![self.length().unwrap_or(0) as f64],
        };
        caps.single_or(&request, || self.apply(values))
    }

    /// The window length, for smoothers that have one.
    pub fn length(&self) -> Option<usize> {
        match self {
            MovingAverage::Sma { length }
            | MovingAverage::Ema { length }
            | MovingAverage::Rma { length }
            | MovingAverage::Dema { length }
            | MovingAverage::Tema { length } => Some(*length),
            MovingAverage::Jma(p) => Some(p.length),
            MovingAverage::Kama(p) => Some(p.length),
            MovingAverage::Vidya(p) => Some(p.length),
            MovingAverage::Ssf(p) => Some(p.length),
            MovingAverage::Ssf3(p) => Some(p.length),
            MovingAverage::Hwma(_) | MovingAverage::Mama(_) | MovingAverage::Trendline(_) => None,
        }
    }

    /// Leading NaN count on a fully valid input.
    pub fn lookback(&self) -> usize {
        match self {
            MovingAverage::Sma { length }
            | MovingAverage::Ema { length }
            | MovingAverage::Rma { length } => length.saturating_sub(1),
            MovingAverage::Dema { length } => 2 * length.saturating_sub(1),
            MovingAverage::Tema { length } => 3 * length.saturating_sub(1),
            MovingAverage::Jma(p) => p.length.saturating_sub(1),
            MovingAverage::Kama(p) => p.length.saturating_sub(1),
            MovingAverage::Vidya(p) => p.length,
            MovingAverage::Hwma(_) | MovingAverage::Ssf(_) | MovingAverage::Ssf3(_) => 0,
            MovingAverage::Mama(p) => p.prenan,
            MovingAverage::Trendline(p) => p.prenan,
        }
    }
}

impl fmt::Display for MovingAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_ascii_lowercase())
    }
}

/// A fixed-alpha average (SMA, EMA, RMA, DEMA, TEMA) as a frame column.
#[derive(Debug, Clone)]
pub struct Average {
    ma: MovingAverage,
    source: PriceSource,
    name: String,
}

impl Average {
    pub fn new(ma: MovingAverage, source: PriceSource) -> Self {
        let name = match ma.length() {
            Some(length) => format!("{}_{length}", ma.label()),
            None => ma.label().to_string(),
        };
        Self { ma, source, name }
    }
}

impl Indicator for Average {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        self.ma.lookback()
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.ma.apply_with(&self.source.extract(bars), caps)?;
        Ok(vec![Column::float(&self.name, Category::Overlap, values)])
    }
}
