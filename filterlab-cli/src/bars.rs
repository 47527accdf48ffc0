//! OHLCV CSV loading.
//!
//! Expected header: `date` (or `timestamp` / `datetime`), `open`, `high`,
//! `low`, `close` and an optional `volume`. Capitalized headers are accepted.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use filterlab_core::Bar;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(alias = "Date", alias = "timestamp", alias = "Timestamp", alias = "datetime")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: Option<f64>,
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(ts);
        }
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("unrecognized timestamp '{raw}'"))?;
    date.and_hms_opt(0, 0, 0)
        .with_context(|| format!("unrecognized timestamp '{raw}'"))
}

/// Load bars from a CSV file. Timestamps must be strictly increasing.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open bar file {}", path.display()))?;

    let mut bars: Vec<Bar> = Vec::new();
    for (row, record) in reader.deserialize::<BarRecord>().enumerate() {
        let record = record.with_context(|| format!("{}: row {}", path.display(), row + 1))?;
        let timestamp = parse_timestamp(&record.date)
            .with_context(|| format!("{}: row {}", path.display(), row + 1))?;
        if let Some(prev) = bars.last() {
            if timestamp <= prev.timestamp {
                bail!(
                    "{}: row {}: timestamp {timestamp} is not after {}",
                    path.display(),
                    row + 1,
                    prev.timestamp
                );
            }
        }
        let bar = Bar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume.unwrap_or(0.0),
        };
        if !bar.is_sane() {
            tracing::warn!(row = row + 1, %timestamp, "bar fails OHLC sanity check");
        }
        bars.push(bar);
    }

    tracing::info!(path = %path.display(), bars = bars.len(), "bars loaded");
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_date_only_rows() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-02,100,105,98,103,5000\n\
             2024-01-03,103,106,101,104,6000\n",
        );
        let bars = load_bars(file.path()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 104.0);
        assert_eq!(bars[0].timestamp, parse_timestamp("2024-01-02").unwrap());
    }

    #[test]
    fn accepts_capitalized_headers_and_missing_volume() {
        let file = write_csv(
            "Date,Open,High,Low,Close\n\
             2024-01-02 09:30:00,100,105,98,103\n",
        );
        let bars = load_bars(file.path()).unwrap();
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(
            bars[0].timestamp,
            parse_timestamp("2024-01-02T09:30:00").unwrap()
        );
    }

    #[test]
    fn rejects_unordered_timestamps() {
        let file = write_csv(
            "date,open,high,low,close\n\
             2024-01-03,100,105,98,103\n\
             2024-01-02,100,105,98,103\n",
        );
        let err = load_bars(file.path()).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn rejects_bad_timestamp() {
        assert!(parse_timestamp("02/01/2024").is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_bars(Path::new("/nonexistent/bars.csv")).unwrap_err();
        assert!(err.to_string().contains("bars.csv"), "{err}");
    }
}
