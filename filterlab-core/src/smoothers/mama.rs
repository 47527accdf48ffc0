//! MESA Adaptive Moving Average (MAMA) and Following Adaptive MA (FAMA).
//!
//! The smoothing factor follows the rate of change of the cycle phase
//! measured by the Hilbert discriminator: `alpha = fastlimit / dPhase`,
//! bounded to `[slowlimit, fastlimit]`. FAMA applies half that alpha to MAMA.

use crate::backend::{Capabilities, ReferenceRequest};
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::filters::hilbert::{window_at, HilbertDiscriminator, WINDOW};
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::series::{ensure_finite, first_valid, mask_prefix, verify};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MamaParams {
    pub fastlimit: f64,
    pub slowlimit: f64,
    /// Leading MAMA/FAMA values forced to NaN.
    pub prenan: usize,
}

impl Default for MamaParams {
    fn default() -> Self {
        Self {
            fastlimit: 0.5,
            slowlimit: 0.05,
            prenan: 3,
        }
    }
}

impl MamaParams {
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let mut fastlimit = n.positive("fastlimit", raw.get("fastlimit"), d.fastlimit);
        let mut slowlimit = n.positive("slowlimit", raw.get("slowlimit"), d.slowlimit);
        let prenan = n.count("prenan", raw.get("prenan"), d.prenan);
        if slowlimit > fastlimit {
            n.note("fastlimit", fastlimit, slowlimit);
            n.note("slowlimit", slowlimit, fastlimit);
            std::mem::swap(&mut fastlimit, &mut slowlimit);
        }
        n.finish(Self {
            fastlimit,
            slowlimit,
            prenan,
        })
    }

    fn suffix(&self) -> String {
        format!("{}_{}", self.fastlimit, self.slowlimit)
    }
}

/// MAMA and FAMA plus the per-bar diagnostics that drove them.
#[derive(Debug, Clone, PartialEq)]
pub struct MamaOutput {
    pub mama: Vec<f64>,
    pub fama: Vec<f64>,
    /// Smoothed dominant cycle period; NaN before the first estimate.
    pub period: Vec<f64>,
    /// Adaptive alpha; NaN before the first estimate.
    pub alpha: Vec<f64>,
}

/// Compute MAMA/FAMA over `values`.
pub fn mama(values: &[f64], params: &MamaParams) -> Result<MamaOutput> {
    verify(values, params.prenan.max(WINDOW - 1) + 1)?;
    let start = first_valid(values).unwrap_or(0);
    let prices = &values[start..];
    let n = values.len();

    let mut out = MamaOutput {
        mama: vec![f64::NAN; n],
        fama: vec![f64::NAN; n],
        period: vec![f64::NAN; n],
        alpha: vec![f64::NAN; n],
    };

    let mut disc = HilbertDiscriminator::new();
    let mut prev_mama = prices[0];
    let mut prev_fama = prices[0];
    for (i, &price) in prices.iter().enumerate() {
        let at = start + i;
        if i < WINDOW - 1 {
            // Not enough history for the discriminator: follow price.
            prev_mama = price;
            prev_fama = price;
        } else {
            let est = disc.update(&window_at(prices, i));
            let alpha = (params.fastlimit / est.delta_phase)
                .min(params.fastlimit)
                .max(params.slowlimit);
            prev_mama = alpha * price + (1.0 - alpha) * prev_mama;
            prev_fama = 0.5 * alpha * prev_mama + (1.0 - 0.5 * alpha) * prev_fama;
            out.period[at] = est.period;
            out.alpha[at] = alpha;
        }
        out.mama[at] = prev_mama;
        out.fama[at] = prev_fama;
    }

    mask_prefix(&mut out.mama[start..], params.prenan);
    mask_prefix(&mut out.fama[start..], params.prenan);
    out.mama = ensure_finite("MAMA", out.mama)?;
    out.fama = ensure_finite("FAMA", out.fama)?;
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct Mama {
    params: MamaParams,
    source: PriceSource,
    name: String,
}

impl Mama {
    pub fn new(params: MamaParams, source: PriceSource) -> Self {
        Self {
            name: format!("MAMA_{}", params.suffix()),
            params,
            source,
        }
    }
}

impl Indicator for Mama {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Overlap
    }

    fn lookback(&self) -> usize {
        self.params.prenan
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.source.extract(bars);
        let request = ReferenceRequest {
            function: "MAMA",
            inputs: vec![values.as_slice()],
            params: vec![self.params.fastlimit, self.params.slowlimit],
        };
        let (m, f) = match caps.substitute(&request, 2) {
            Some(mut series) => {
                let f = series.pop().unwrap_or_default();
                let m = series.pop().unwrap_or_default();
                (m, f)
            }
            None => {
                let out = mama(&values, &self.params)?;
                (out.mama, out.fama)
            }
        };
        let suffix = self.params.suffix();
        Ok(vec![
            Column::float(format!("MAMA_{suffix}"), Category::Overlap, m),
            Column::float(format!("FAMA_{suffix}"), Category::Overlap, f),
        ])
    }
}
