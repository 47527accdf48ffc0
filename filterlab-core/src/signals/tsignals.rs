//! Trend signals: trade entries and exits derived from a binary trend.

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, PriceSource};
use crate::error::Result;
use crate::indicator::Indicator;
use crate::params::{Normalized, Normalizer, ParamMap};
use crate::post::shift;
use crate::series::verify;
use crate::smoothers::MovingAverage;

/// How trend, entry and exit columns are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalMode {
    /// 0 / 1 integer columns.
    #[default]
    Integer,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TsignalsParams {
    /// The trend is on while `trend > trend_reset`.
    pub trend_reset: f64,
    /// Bars to delay (positive) or lead (negative) the trades.
    pub trade_offset: i64,
    pub mode: SignalMode,
}

impl Default for TsignalsParams {
    fn default() -> Self {
        Self {
            trend_reset: 0.0,
            trade_offset: 0,
            mode: SignalMode::Integer,
        }
    }
}

impl TsignalsParams {
    /// Keys `trend_reset`, `trade_offset` and `asbool`.
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let d = Self::default();
        let mut n = Normalizer::new();
        let trend_reset = n.finite("trend_reset", raw.get("trend_reset"), d.trend_reset);
        let trade_offset = n.integer("trade_offset", raw.get("trade_offset"), d.trade_offset);
        let asbool = n.flag("asbool", raw.get("asbool"), false);
        n.finish(Self {
            trend_reset,
            trade_offset,
            mode: if asbool {
                SignalMode::Boolean
            } else {
                SignalMode::Integer
            },
        })
    }
}

/// Trend state and trade events per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSignals {
    pub trends: Vec<bool>,
    /// +1 on an entry, -1 on an exit, 0 otherwise.
    pub trades: Vec<i64>,
    pub entries: Vec<bool>,
    pub exits: Vec<bool>,
}

impl TrendSignals {
    /// Derive trades from an already binary trend.
    pub fn from_trends(trends: Vec<bool>, trade_offset: i64) -> Self {
        let raw: Vec<i64> = (0..trends.len())
            .map(|i| {
                if i == 0 {
                    0
                } else {
                    i64::from(trends[i]) - i64::from(trends[i - 1])
                }
            })
            .collect();
        let trades = shift(&raw, trade_offset, 0);
        let entries = trades.iter().map(|&t| t > 0).collect();
        let exits = trades.iter().map(|&t| t < 0).collect();
        Self {
            trends,
            trades,
            entries,
            exits,
        }
    }

    pub fn len(&self) -> usize {
        self.trends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trends.is_empty()
    }

    /// `TS_Trends`, `TS_Trades`, `TS_Entries`, `TS_Exits`.
    pub fn into_columns(self, mode: SignalMode) -> Vec<Column> {
        let flags = |name: &str, values: Vec<bool>| match mode {
            SignalMode::Boolean => Column::bool(name, Category::Trend, values),
            SignalMode::Integer => Column::int(
                name,
                Category::Trend,
                values.into_iter().map(i64::from).collect(),
            ),
        };
        vec![
            flags("TS_Trends", self.trends),
            Column::int("TS_Trades", Category::Trend, self.trades),
            flags("TS_Entries", self.entries),
            flags("TS_Exits", self.exits),
        ]
    }
}

/// Entries where `trend` rises through `trend_reset`, exits where it falls
/// back. NaN trend values count as off.
pub fn tsignals(trend: &[f64], params: &TsignalsParams) -> Result<TrendSignals> {
    verify(trend, 1)?;
    let on = trend.iter().map(|&t| t > params.trend_reset).collect();
    Ok(TrendSignals::from_trends(on, params.trade_offset))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFilterParams {
    /// The trend is the price minus this average.
    pub ma: MovingAverage,
    pub signals: TsignalsParams,
}

impl Default for TrendFilterParams {
    fn default() -> Self {
        Self {
            ma: MovingAverage::Sma { length: 50 },
            signals: TsignalsParams::default(),
        }
    }
}

impl TrendFilterParams {
    /// `length` and `mamode` pick the average; the rest as for
    /// [`TsignalsParams::normalize`].
    pub fn normalize(raw: &ParamMap) -> Normalized<Self> {
        let mut n = Normalizer::new();
        let length = n.length("length", raw.get("length"), 50);
        let ma = n.choice(
            "mamode",
            raw.get("mamode"),
            MovingAverage::Sma { length },
            |name| MovingAverage::from_name(name, length),
        );
        let mut norm = n.finish(ma).map(|ma| Self {
            ma,
            signals: TsignalsParams::default(),
        });
        let signals = norm.absorb(TsignalsParams::normalize(raw));
        norm.params.signals = signals;
        norm
    }
}

/// Trend signals for price above a moving average.
#[derive(Debug, Clone)]
pub struct TrendFilter {
    params: TrendFilterParams,
    source: PriceSource,
    name: String,
}

impl TrendFilter {
    pub fn new(params: TrendFilterParams, source: PriceSource) -> Self {
        Self {
            name: "TS_Trends".to_string(),
            params,
            source,
        }
    }
}

impl Indicator for TrendFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Trend
    }

    fn lookback(&self) -> usize {
        self.params.ma.lookback()
    }

    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>> {
        let values = self.source.extract(bars);
        let ma = self.params.ma.apply_with(&values, caps)?;
        let trend: Vec<f64> = values.iter().zip(&ma).map(|(p, m)| p - m).collect();
        let signals = tsignals(&trend, &self.params.signals)?;
        Ok(signals.into_columns(self.params.signals.mode))
    }
}
