//! Ehlers SuperSmoother filters (2-pole and 3-pole).
//!
//! Coefficients are fixed per length; the output is a linear recurrence on
//! its own previous two (three) values. The first two (three) bars carry
//! the raw input.

use crate::backend::{Capabilities, ReferenceRequest};
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, on_valid_tail, require_length};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsfParams {
    pub length: usize,
    pub pi: f64,
    pub sqrt2: f64,
    /// Use the coefficient convention common in charting packages:
    /// `b = 2a·cos(π√2/n)` instead of Ehlers' `2a·cos(180·√2/n)`.
    pub everget: bool,
}

impl Default for SsfParams {
    fn default() -> Self {
        Self {
            length: 20,
            pi: 3.14159,
            sqrt2: 1.414,
            everget: false,
        }
    }
}

impl SsfParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), d.length);
        let pi = n.positive("pi", raw.get("pi"), d.pi);
        let sqrt2 = n.positive("sqrt2", raw.get("sqrt2"), d.sqrt2);
        let everget = n.flag("everget", raw.get("everget"), d.everget);
        n.finish(Self {
            length,
            pi,
            sqrt2,
            everget,
        })
    }

    pub fn label(&self) -> String {
        format!("SSF_{}", self.length)
    }

    /// `(c/2, b, a²)` for `y[i] = c/2·(x[i] + x[i-1]) + b·y[i-1] - a²·y[i-2]`.
    fn coefficients(&self) -> (f64, f64, f64) {
        let n = self.length as f64;
        let arg = self.pi * self.sqrt2 / n;
        let a = (-arg).exp();
        let b = if self.everget {
            2.0 * a * arg.cos()
        } else {
            2.0 * a * (180.0 * self.sqrt2 / n).cos()
        };
        let a2 = a * a;
        let c = a2 - b + 1.0;
        (0.5 * c, b, a2)
    }
}

/// 2-pole SuperSmoother.
pub fn ssf(values: &[f64], params: &SsfParams) -> Result<Vec<f64>> {
    require_length("length", params.length)?;
    let (half_c, b, a2) = params.coefficients();
    let out = on_valid_tail(values, 1, |x| {
        let mut y = x.to_vec();
        for i in 2..x.len() {
            y[i] = half_c * (x[i] + x[i - 1]) + b * y[i - 1] - a2 * y[i - 2];
        }
        y
    })?;
    ensure_finite("SSF", out)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ssf3Params {
    pub length: usize,
    pub pi: f64,
    pub sqrt3: f64,
}

impl Default for Ssf3Params {
    fn default() -> Self {
        Self {
            length: 20,
            pi: 3.14159,
            sqrt3: 1.732,
        }
    }
}

impl Ssf3Params {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), d.length);
        let pi = n.positive("pi", raw.get("pi"), d.pi);
        let sqrt3 = n.positive("sqrt3", raw.get("sqrt3"), d.sqrt3);
        n.finish(Self { length, pi, sqrt3 })
    }

    pub fn label(&self) -> String {
        format!("SSF3_{}", self.length)
    }

    /// `[d1, d2, d3, d4]`.
    fn coefficients(&self) -> [f64; 4] {
        let n = self.length as f64;
        let a = (-self.pi / n).exp();
        let b = 2.0 * a * (-self.pi * self.sqrt3 / n).cos();
        let c = a * a;
        let d4 = c * c;
        let d3 = -c * (1.0 + b);
        let d2 = b + c;
        let d1 = 1.0 - d2 - d3 - d4;
        [d1, d2, d3, d4]
    }
}

/// 3-pole SuperSmoother.
pub fn ssf3(values: &[f64], params: &Ssf3Params) -> Result<Vec<f64>> {
    require_length("length", params.length)?;
    let [d1, d2, d3, d4] = params.coefficients();
    let out = on_valid_tail(values, 1, |x| {
        let mut y = x.to_vec();
        for i in 3..x.len() {
            y[i] = d1 * x[i] + d2 * y[i - 1] + d3 * y[i - 2] + d4 * y[i - 3];
        }
        y
    })?;
    ensure_finite("SSF3", out)
}

#[derive(Debug, Clone)]
pub struct Ssf {
    params: SsfParams,
    source: PriceSource,
    name: String,
}

impl Ssf {
    pub fn new(params: SsfParams, source: PriceSource) -> Self {
        Self {
            name: params.label(),
            params,
            source,
        }
    }
}

impl Indicator for Ssf {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.source.extract(bars);
        let request = ReferenceRequest {
            function: "SSF",
            inputs: vec![values.as_slice()],
            params: vec![self.params.length as f64],
        };
        let out = caps.single_or(&request, || ssf(&values, &self.params))?;
        Ok(vec![Column::float(&self.name, Category::Overlap, out)])
    }
}

#[derive(Debug, Clone)]
pub struct Ssf3 {
    params: Ssf3Params,
    source: PriceSource,
    name: String,
}

impl Ssf3 {
    pub fn new(params: Ssf3Params, source: PriceSource) -> Self {
        Self {
            name: params.label(),
            params,
            source,
        }
    }
}

impl Indicator for Ssf3 {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
        let out = ssf3(&self.source.extract(bars), &self.params)?;
        Ok(vec![Column::float(&self.name, Category::Overlap, out)])
    }
}
