//! Offset and fill post-processing.
//!
//! Applied by the frame builder after an indicator has produced its raw
//! columns. Recurrences never shift or fill their own output.

use serde::{Deserialize, Serialize};

use crate::domain::{Column, ColumnValues};

/// How remaining NaN values are filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FillRepr", into = "FillRepr")]
pub enum Fill {
    /// Replace with a constant.
    Value(f64),
    /// Carry the last valid value forward.
    Forward,
    /// Carry the next valid value backward.
    Backward,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FillRepr {
    Value(f64),
    Method(String),
}

impl TryFrom<FillRepr> for Fill {
    type Error = String;

    fn try_from(repr: FillRepr) -> Result<Self, Self::Error> {
        match repr {
            FillRepr::Value(v) => Ok(Fill::Value(v)),
            FillRepr::Method(m) => match m.as_str() {
                "ffill" | "pad" | "forward" => Ok(Fill::Forward),
                "bfill" | "backfill" | "backward" => Ok(Fill::Backward),
                other => Err(format!("unknown fill method: {other}")),
            },
        }
    }
}

impl From<Fill> for FillRepr {
    fn from(fill: Fill) -> Self {
        match fill {
            Fill::Value(v) => FillRepr::Value(v),
            Fill::Forward => FillRepr::Method("ffill".to_string()),
            Fill::Backward => FillRepr::Method("bfill".to_string()),
        }
    }
}

/// Offset and fill settings for one indicator's columns.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcess {
    pub offset: i64,
    pub fill: Option<Fill>,
}

impl PostProcess {
    pub fn is_identity(&self) -> bool {
        self.offset == 0 && self.fill.is_none()
    }

    /// Shift then fill a column. Integer and boolean columns have no missing
    /// marker: vacated bars become 0 / false and fill does not apply.
    pub fn apply(&self, column: Column) -> Column {
        if self.is_identity() {
            return column;
        }
        let values = match column.values {
            ColumnValues::Float(v) => {
                let mut shifted = apply_offset(&v, self.offset);
                if let Some(fill) = self.fill {
                    apply_fill(&mut shifted, fill);
                }
                ColumnValues::Float(shifted)
            }
            ColumnValues::Int(v) => ColumnValues::Int(shift(&v, self.offset, 0)),
            ColumnValues::Bool(v) => ColumnValues::Bool(shift(&v, self.offset, false)),
        };
        Column { values, ..column }
    }
}

/// Shift `values` by `offset` bars. Positive offsets move values later in
/// time, negative offsets earlier; vacated bars are NaN.
pub fn apply_offset(values: &[f64], offset: i64) -> Vec<f64> {
    shift(values, offset, f64::NAN)
}

pub(crate) fn shift<T: Copy>(values: &[T], offset: i64, vacant: T) -> Vec<T> {
    let n = values.len();
    let k = offset.unsigned_abs() as usize;
    if offset == 0 {
        return values.to_vec();
    }
    if k >= n {
        return vec![vacant; n];
    }
    let mut out = vec![vacant; n];
    if offset > 0 {
        out[k..].copy_from_slice(&values[..n - k]);
    } else {
        out[..n - k].copy_from_slice(&values[k..]);
    }
    out
}

/// Fill NaN values in place.
pub fn apply_fill(values: &mut [f64], fill: Fill) {
    match fill {
        Fill::Value(x) => {
            for v in values.iter_mut().filter(|v| v.is_nan()) {
                *v = x;
            }
        }
        Fill::Forward => {
            let mut last = f64::NAN;
            for v in values.iter_mut() {
                if v.is_nan() {
                    *v = last;
                } else {
                    last = *v;
                }
            }
        }
        Fill::Backward => {
            let mut next = f64::NAN;
            for v in values.iter_mut().rev() {
                if v.is_nan() {
                    *v = next;
                } else {
                    next = *v;
                }
            }
        }
    }
}
