//! Bar: the fundamental market data unit, and price-source selection.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument at a single timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, and open/close inside the range.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Which price series an indicator reads from a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    Hl2,
    Hlc3,
    Ohlc4,
}

impl PriceSource {
    pub fn value(self, bar: &Bar) -> f64 {
        match self {
            PriceSource::Open => bar.open,
            PriceSource::High => bar.high,
            PriceSource::Low => bar.low,
            PriceSource::Close => bar.close,
            PriceSource::Hl2 => bar.hl2(),
            PriceSource::Hlc3 => (bar.high + bar.low + bar.close) / 3.0,
            PriceSource::Ohlc4 => (bar.open + bar.high + bar.low + bar.close) / 4.0,
        }
    }

    /// Extract the selected price as an owned series.
    pub fn extract(self, bars: &[Bar]) -> Vec<f64> {
        bars.iter().map(|b| self.value(b)).collect()
    }
}

/// Column-oriented view of a bar slice, used by multi-input engines.
#[derive(Debug, Clone, Default)]
pub struct Ohlc {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl Ohlc {
    pub fn from_bars(bars: &[Bar]) -> Self {
        Self {
            high: PriceSource::High.extract(bars),
            low: PriceSource::Low.extract(bars),
            close: PriceSource::Close.extract(bars),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn price_sources() {
        let bar = sample_bar();
        assert_eq!(PriceSource::Close.value(&bar), 103.0);
        assert_eq!(PriceSource::Hl2.value(&bar), 101.5);
        assert_eq!(PriceSource::Hlc3.value(&bar), (105.0 + 98.0 + 103.0) / 3.0);
        assert_eq!(PriceSource::Ohlc4.value(&bar), 101.5);
    }

    #[test]
    fn price_source_deserializes_snake_case() {
        let src: PriceSource = serde_json::from_str("\"hlc3\"").unwrap();
        assert_eq!(src, PriceSource::Hlc3);
    }
}
