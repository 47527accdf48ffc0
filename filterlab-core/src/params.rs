//! Parameter normalization.
//!
//! Raw parameters arrive untyped (from TOML or from callers) and may be
//! missing, out of range, or of the wrong type. Normalization never fails:
//! a bad value is replaced by its documented default, and the replacement is
//! recorded as an [`Adjustment`] so callers and tests can observe it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named raw parameters for one indicator, as read from a config file.
pub type ParamMap = BTreeMap<String, RawValue>;

/// An untyped parameter value as written by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(v) => write!(f, "{v}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(v) => write!(f, "{v}"),
            RawValue::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl RawValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Int(v) => Some(*v as f64),
            RawValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// One replaced parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub param: &'static str,
    pub given: String,
    pub used: String,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.param, self.given, self.used)
    }
}

/// Normalized parameters plus the list of replacements made to reach them.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<P> {
    pub params: P,
    pub adjustments: Vec<Adjustment>,
}

impl<P> Normalized<P> {
    /// True when every given parameter was used as-is.
    pub fn is_clean(&self) -> bool {
        self.adjustments.is_empty()
    }

    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Normalized<Q> {
        Normalized {
            params: f(self.params),
            adjustments: self.adjustments,
        }
    }

    /// Carry over adjustments recorded for a nested parameter set.
    pub fn absorb<Q>(&mut self, nested: Normalized<Q>) -> Q {
        self.adjustments.extend(nested.adjustments);
        nested.params
    }
}

/// Collects adjustments while a parameter struct is being normalized.
#[derive(Debug, Default)]
pub struct Normalizer {
    adjustments: Vec<Adjustment>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, param: &'static str, given: &RawValue, used: impl fmt::Display) {
        self.adjustments.push(Adjustment {
            param,
            given: given.to_string(),
            used: used.to_string(),
        });
    }

    /// A strictly positive integer (window length, period). Floats are
    /// truncated; anything that truncates below 1 falls back to `default`.
    pub fn length(&mut self, param: &'static str, given: Option<&RawValue>, default: usize) -> usize {
        let Some(raw) = given else {
            return default;
        };
        match raw {
            RawValue::Int(v) if *v > 0 => *v as usize,
            RawValue::Float(v) if v.is_finite() && *v >= 1.0 => {
                let used = v.trunc() as usize;
                if (used as f64) != *v {
                    self.record(param, raw, used);
                }
                used
            }
            _ => {
                self.record(param, raw, default);
                default
            }
        }
    }

    /// A non-negative integer (warm-up counts).
    pub fn count(&mut self, param: &'static str, given: Option<&RawValue>, default: usize) -> usize {
        let Some(raw) = given else {
            return default;
        };
        match raw {
            RawValue::Int(v) if *v >= 0 => *v as usize,
            _ => {
                self.record(param, raw, default);
                default
            }
        }
    }

    /// Any integer, negative values included (offsets).
    pub fn integer(&mut self, param: &'static str, given: Option<&RawValue>, default: i64) -> i64 {
        let Some(raw) = given else {
            return default;
        };
        match raw {
            RawValue::Int(v) => *v,
            _ => {
                self.record(param, raw, default);
                default
            }
        }
    }

    /// A finite, strictly positive number.
    pub fn positive(&mut self, param: &'static str, given: Option<&RawValue>, default: f64) -> f64 {
        self.number_where(param, given, default, |v| v > 0.0)
    }

    /// A number strictly inside (0, 1).
    pub fn unit_open(&mut self, param: &'static str, given: Option<&RawValue>, default: f64) -> f64 {
        self.number_where(param, given, default, |v| v > 0.0 && v < 1.0)
    }

    /// Any finite number.
    pub fn finite(&mut self, param: &'static str, given: Option<&RawValue>, default: f64) -> f64 {
        self.number_where(param, given, default, |_| true)
    }

    fn number_where(
        &mut self,
        param: &'static str,
        given: Option<&RawValue>,
        default: f64,
        accept: impl Fn(f64) -> bool,
    ) -> f64 {
        let Some(raw) = given else {
            return default;
        };
        match raw.as_f64() {
            Some(v) if v.is_finite() && accept(v) => v,
            _ => {
                self.record(param, raw, default);
                default
            }
        }
    }

    pub fn flag(&mut self, param: &'static str, given: Option<&RawValue>, default: bool) -> bool {
        let Some(raw) = given else {
            return default;
        };
        match raw {
            RawValue::Bool(v) => *v,
            _ => {
                self.record(param, raw, default);
                default
            }
        }
    }

    /// A text value parsed by `parse`; unparseable text falls back to `default`.
    pub fn choice<T: fmt::Display>(
        &mut self,
        param: &'static str,
        given: Option<&RawValue>,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> T {
        let Some(raw) = given else {
            return default;
        };
        match raw {
            RawValue::Text(s) => match parse(s) {
                Some(v) => v,
                None => {
                    self.record(param, raw, &default);
                    default
                }
            },
            _ => {
                self.record(param, raw, &default);
                default
            }
        }
    }

    /// Record a replacement decided by the caller, e.g. after a check that
    /// spans several parameters.
    pub fn note(&mut self, param: &'static str, given: impl fmt::Display, used: impl fmt::Display) {
        self.adjustments.push(Adjustment {
            param,
            given: given.to_string(),
            used: used.to_string(),
        });
    }

    pub fn finish<P>(self, params: P) -> Normalized<P> {
        Normalized {
            params,
            adjustments: self.adjustments,
        }
    }
}
