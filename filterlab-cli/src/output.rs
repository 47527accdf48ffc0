//! Frame rendering: CSV (one row per bar) or JSON (column-oriented).

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::ValueEnum;
use filterlab_core::{ColumnValues, Frame};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == chrono::NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Write the frame as CSV. NaN cells are left empty.
pub fn write_csv<W: Write>(frame: &Frame, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["timestamp"];
    header.extend(frame.column_names());
    wtr.write_record(&header)?;

    for (i, ts) in frame.index().iter().enumerate() {
        let mut row = Vec::with_capacity(frame.width() + 1);
        row.push(format_timestamp(ts));
        row.extend(frame.columns().iter().map(|c| c.values.render(i)));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    name: &'a str,
    category: &'static str,
    values: Vec<Value>,
}

#[derive(Serialize)]
struct JsonFrame<'a> {
    index: Vec<String>,
    columns: Vec<JsonColumn<'a>>,
}

/// NaN becomes `null`.
fn json_values(values: &ColumnValues) -> Vec<Value> {
    match values {
        ColumnValues::Float(v) => v.iter().map(|&x| Value::from(x)).collect(),
        ColumnValues::Int(v) => v.iter().map(|&x| Value::from(x)).collect(),
        ColumnValues::Bool(v) => v.iter().map(|&x| Value::from(x)).collect(),
    }
}

/// Write the frame as pretty-printed JSON.
pub fn write_json<W: Write>(frame: &Frame, mut writer: W) -> Result<()> {
    let doc = JsonFrame {
        index: frame.index().iter().map(format_timestamp).collect(),
        columns: frame
            .columns()
            .iter()
            .map(|c| JsonColumn {
                name: &c.name,
                category: c.category.as_str(),
                values: json_values(&c.values),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &doc)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_frame<W: Write>(frame: &Frame, format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(frame, writer),
        OutputFormat::Json => write_json(frame, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use filterlab_core::{Category, Column};

    fn sample_frame() -> Frame {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut frame = Frame::new(vec![base, base + chrono::Duration::days(1)]);
        frame
            .push(Column::float("SMA_2", Category::Overlap, vec![f64::NAN, 1.5]))
            .unwrap();
        frame
            .push(Column::int("TS_Trades", Category::Trend, vec![0, 1]))
            .unwrap();
        frame
            .push(Column::bool("INC_1", Category::Trend, vec![false, true]))
            .unwrap();
        frame
    }

    #[test]
    fn csv_has_header_and_empty_nan_cells() {
        let mut buf = Vec::new();
        write_csv(&sample_frame(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,SMA_2,TS_Trades,INC_1");
        assert_eq!(lines[1], "2024-01-02,,0,false");
        assert_eq!(lines[2], "2024-01-03,1.5,1,true");
    }

    #[test]
    fn json_maps_nan_to_null() {
        let mut buf = Vec::new();
        write_json(&sample_frame(), &mut buf).unwrap();
        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["index"][1], "2024-01-03");
        assert_eq!(doc["columns"][0]["name"], "SMA_2");
        assert_eq!(doc["columns"][0]["category"], "overlap");
        assert!(doc["columns"][0]["values"][0].is_null());
        assert_eq!(doc["columns"][0]["values"][1], 1.5);
        assert_eq!(doc["columns"][2]["values"][1], true);
    }

    #[test]
    fn intraday_timestamps_keep_the_time() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02 09:30:00");
    }
}
