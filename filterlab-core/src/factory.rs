//! Factory: converts an [`IndicatorConfig`] into a runtime indicator.
//!
//! Parameters are normalized, never rejected: every replaced value is logged
//! at warn level and reported back to the caller. Only an unknown indicator
//! kind is an error.

use serde::{Deserialize, Serialize};

use crate::domain::PriceSource;
use crate::filters::{Ssf, Ssf3, Ssf3Params, SsfParams, Trendline, TrendlineParams};
use crate::indicator::{Indicator, Planned};
use crate::params::{Normalized, Normalizer, ParamMap, RawValue};
use crate::post::{Fill, PostProcess};
use crate::signals::{
    CrossLevels, Monotonic, MonotonicParams, Runs, RunsParams, Slope, TrendFilter,
    TrendFilterParams, Xsignals, XsignalsParams,
};
use crate::smoothers::{
    Average, Hwma, HwmaParams, Jma, JmaParams, Kama, KamaParams, Mama, MamaParams, MovingAverage,
    Vidya, VidyaParams, Zlma, ZlmaParams,
};
use crate::stops::{
    AtrTrailing, AtrTrailingParams, Chandelier, ChandelierParams, Psar, PsarParams, Supertrend,
    SupertrendParams,
};
use crate::volatility::{Atr, AtrParams};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during indicator construction.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown indicator kind: {0}")]
    UnknownIndicator(String),
}

// ─── Config ──────────────────────────────────────────────────────────

/// One `[[indicator]]` entry of a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub kind: String,
    #[serde(default)]
    pub source: PriceSource,
    /// Overrides the file-wide offset.
    #[serde(default)]
    pub offset: Option<i64>,
    /// Overrides the file-wide fill.
    #[serde(default)]
    pub fill: Option<Fill>,
    #[serde(default)]
    pub params: ParamMap,
}

impl IndicatorConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            source: PriceSource::default(),
            offset: None,
            fill: None,
            params: ParamMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Post-processing for this indicator, falling back to `defaults`.
    pub fn post(&self, defaults: &PostProcess) -> PostProcess {
        PostProcess {
            offset: self.offset.unwrap_or(defaults.offset),
            fill: self.fill.or(defaults.fill),
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn boxed<P, I, F>(norm: Normalized<P>, build: F) -> Normalized<Box<dyn Indicator>>
where
    I: Indicator + 'static,
    F: FnOnce(P) -> I,
{
    norm.map(|p| Box::new(build(p)) as Box<dyn Indicator>)
}

fn length_only(raw: &ParamMap, default: usize) -> Normalized<usize> {
    let mut n = Normalizer::new();
    let length = n.length("length", raw.get("length"), default);
    n.finish(length)
}

// ─── Indicator factory ───────────────────────────────────────────────

/// Every kind accepted by [`create_indicator`], aliases excluded.
pub const KINDS: &[&str] = &[
    "sma",
    "ema",
    "rma",
    "dema",
    "tema",
    "jma",
    "kama",
    "vidya",
    "hwma",
    "mama",
    "zlma",
    "ssf",
    "ssf3",
    "ht_trendline",
    "atr",
    "psar",
    "supertrend",
    "chandelier_exit",
    "atr_trailing_stop",
    "increasing",
    "decreasing",
    "runs",
    "tsignals",
    "xsignals",
];

/// Create an indicator from an `IndicatorConfig`.
pub fn create_indicator(
    config: &IndicatorConfig,
) -> Result<Normalized<Box<dyn Indicator>>, FactoryError> {
    let source = config.source;
    let raw = &config.params;
    let kind = config.kind.to_ascii_lowercase();
    let built = match kind.as_str() {
        "sma" | "ema" | "rma" | "dema" | "tema" => {
            let norm = length_only(raw, 10);
            let ma = MovingAverage::from_name(&kind, norm.params)
                .ok_or_else(|| FactoryError::UnknownIndicator(config.kind.clone()))?;
            boxed(norm, |_| Average::new(ma, source))
        }
        "jma" => boxed(JmaParams::normalize(raw), |p| Jma::new(p, source)),
        "kama" => boxed(KamaParams::normalize(raw), |p| Kama::new(p, source)),
        "vidya" => boxed(VidyaParams::normalize(raw), |p| Vidya::new(p, source)),
        "hwma" => boxed(HwmaParams::normalize(raw), |p| Hwma::new(p, source)),
        "mama" => boxed(MamaParams::normalize(raw), |p| Mama::new(p, source)),
        "zlma" => boxed(ZlmaParams::normalize(raw), |p| Zlma::new(p, source)),
        "ssf" => boxed(SsfParams::normalize(raw), |p| Ssf::new(p, source)),
        "ssf3" => boxed(Ssf3Params::normalize(raw), |p| Ssf3::new(p, source)),
        "ht_trendline" => boxed(TrendlineParams::normalize(raw), |p| {
            Trendline::new(p, source)
        }),
        "atr" => boxed(AtrParams::normalize(raw), Atr::new),
        "psar" => boxed(PsarParams::normalize(raw), Psar::new),
        "supertrend" => boxed(SupertrendParams::normalize(raw), Supertrend::new),
        "chandelier_exit" => boxed(ChandelierParams::normalize(raw), Chandelier::new),
        "atr_trailing_stop" => boxed(AtrTrailingParams::normalize(raw), AtrTrailing::new),
        "increasing" => boxed(MonotonicParams::normalize(raw), |p| {
            Monotonic::new(p, Slope::Rising, source)
        }),
        "decreasing" => boxed(MonotonicParams::normalize(raw), |p| {
            Monotonic::new(p, Slope::Falling, source)
        }),
        "runs" | "long_run" | "short_run" => {
            boxed(RunsParams::normalize(raw), |p| Runs::new(p, source))
        }
        "tsignals" => boxed(TrendFilterParams::normalize(raw), |p| {
            TrendFilter::new(p, source)
        }),
        "xsignals" => {
            let mut norm = XsignalsParams::normalize(raw);
            let levels = norm.absorb(CrossLevels::normalize(raw));
            boxed(norm, |p| Xsignals::new(levels, p, source))
        }
        _ => return Err(FactoryError::UnknownIndicator(config.kind.clone())),
    };

    for adjustment in &built.adjustments {
        tracing::warn!(
            indicator = %config.kind,
            param = adjustment.param,
            given = %adjustment.given,
            used = %adjustment.used,
            "parameter adjusted"
        );
    }
    Ok(built)
}

/// Build the compute plan for a list of configs, attaching each one's
/// post-processing.
pub fn build_plan(
    configs: &[IndicatorConfig],
    defaults: &PostProcess,
) -> Result<Vec<Planned>, FactoryError> {
    configs
        .iter()
        .map(|config| {
            let built = create_indicator(config)?;
            Ok(Planned::new(built.params).with_post(config.post(defaults)))
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────
