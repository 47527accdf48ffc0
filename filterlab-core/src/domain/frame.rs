//! Output columns and the result frame.
//!
//! A `Frame` is a timestamp index plus independently owned, named columns.
//! Columns are appended in computation order; a failed indicator simply
//! contributes nothing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};

/// Category label attached to every output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Overlap,
    Trend,
    Volatility,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Overlap => "overlap",
            Category::Trend => "trend",
            Category::Volatility => "volatility",
        }
    }
}

/// Typed column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index` widened to f64 (booleans as 0/1).
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            ColumnValues::Float(v) => v.get(index).copied(),
            ColumnValues::Int(v) => v.get(index).map(|&x| x as f64),
            ColumnValues::Bool(v) => v.get(index).map(|&x| if x { 1.0 } else { 0.0 }),
        }
    }

    /// Render the value at `index` for text output; NaN renders empty.
    pub fn render(&self, index: usize) -> String {
        match self {
            ColumnValues::Float(v) => match v.get(index) {
                Some(x) if x.is_nan() => String::new(),
                Some(x) => x.to_string(),
                None => String::new(),
            },
            ColumnValues::Int(v) => v.get(index).map(|x| x.to_string()).unwrap_or_default(),
            ColumnValues::Bool(v) => v.get(index).map(|x| x.to_string()).unwrap_or_default(),
        }
    }
}

/// A named, categorized output series.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub category: Category,
    pub values: ColumnValues,
}

impl Column {
    pub fn float(name: impl Into<String>, category: Category, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            category,
            values: ColumnValues::Float(values),
        }
    }

    pub fn int(name: impl Into<String>, category: Category, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            category,
            values: ColumnValues::Int(values),
        }
    }

    pub fn bool(name: impl Into<String>, category: Category, values: Vec<bool>) -> Self {
        Self {
            name: name.into(),
            category,
            values: ColumnValues::Bool(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The float series, if this is a float column.
    pub fn as_floats(&self) -> Option<&[f64]> {
        match &self.values {
            ColumnValues::Float(v) => Some(v),
            _ => None,
        }
    }
}

/// Timestamp index plus computed columns.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    index: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Append a column. Its length must match the index.
    pub fn push(&mut self, column: Column) -> Result<()> {
        if column.len() != self.index.len() {
            return Err(IndicatorError::LengthMismatch {
                expected: self.index.len(),
                got: column.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the value of a named column at a specific bar index.
    pub fn value(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get(name).and_then(|c| c.values.get_f64(bar_index))
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns stored.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn index(n: usize) -> Vec<NaiveDateTime> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| base + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn frame_push_and_get() {
        let mut frame = Frame::new(index(3));
        frame
            .push(Column::float(
                "JMA_7_0",
                Category::Overlap,
                vec![f64::NAN, 1.0, 2.0],
            ))
            .unwrap();
        assert!(frame.value("JMA_7_0", 0).unwrap().is_nan());
        assert_eq!(frame.value("JMA_7_0", 2), Some(2.0));
        assert_eq!(frame.value("JMA_7_0", 3), None);
        assert_eq!(frame.value("missing", 0), None);
    }

    #[test]
    fn frame_rejects_misaligned_column() {
        let mut frame = Frame::new(index(3));
        let err = frame
            .push(Column::bool("LR_2", Category::Trend, vec![true]))
            .unwrap_err();
        assert_eq!(
            err,
            IndicatorError::LengthMismatch {
                expected: 3,
                got: 1
            }
        );
        assert_eq!(frame.width(), 0);
    }

    #[test]
    fn render_formats() {
        let floats = ColumnValues::Float(vec![f64::NAN, 1.5]);
        assert_eq!(floats.render(0), "");
        assert_eq!(floats.render(1), "1.5");
        let bools = ColumnValues::Bool(vec![true]);
        assert_eq!(bools.render(0), "true");
        assert_eq!(bools.get_f64(0), Some(1.0));
    }
}
