//! Holt-Winters Moving Average (HWMA).
//!
//! Triple exponential smoothing of level (F), velocity (V) and acceleration
//! (A). The output `F + V + 0.5·A` is defined from the first bar.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, on_valid_tail};

/// Smoothing factors, each strictly inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HwmaParams {
    pub na: f64,
    pub nb: f64,
    pub nc: f64,
}

impl Default for HwmaParams {
    fn default() -> Self {
        Self {
            na: 0.2,
            nb: 0.1,
            nc: 0.1,
        }
    }
}

impl HwmaParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let na = n.unit_open("na", raw.get("na"), d.na);
        let nb = n.unit_open("nb", raw.get("nb"), d.nb);
        let nc = n.unit_open("nc", raw.get("nc"), d.nc);
        n.finish(Self { na, nb, nc })
    }

    pub fn label(&self) -> String {
        format!("HWMA_{}_{}_{}", self.na, self.nb, self.nc)
    }
}

/// Compute HWMA over `values`.
pub fn hwma(values: &[f64], params: &HwmaParams) -> Result<Vec<f64>> {
    let out = on_valid_tail(values, 1, |tail| hwma_tail(tail, params))?;
    ensure_finite("HWMA", out)
}

fn hwma_tail(prices: &[f64], p: &HwmaParams) -> Vec<f64> {
    let mut level = prices[0];
    let mut velocity = 0.0;
    let mut accel = 0.0;
    prices
        .iter()
        .map(|&price| {
            let f = (1.0 - p.na) * (level + velocity + 0.5 * accel) + p.na * price;
            let v = (1.0 - p.nb) * (velocity + accel) + p.nb * (f - level);
            let a = (1.0 - p.nc) * accel + p.nc * (v - velocity);
            level = f;
            velocity = v;
            accel = a;
            f + v + 0.5 * a
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Hwma {
    params: HwmaParams,
    source: PriceSource,
    name: String,
}

impl Hwma {
    pub fn new(params: HwmaParams, source: PriceSource) -> Self {
        Self {
            name: params.label(),
            params,
            source,
        }
    }
}

impl Indicator for Hwma {
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
        let values = hwma(&self.source.extract(bars), &self.params)?;
        Ok(vec![Column::float(&self.name, Category::Overlap, values)])
    }
}
