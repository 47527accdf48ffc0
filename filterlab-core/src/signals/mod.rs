//! Trend and signal state machines.
//!
//! These turn continuous series (prices, smoothers, stop levels) into
//! binary trend flags and entry/exit events. Every function here is
//! portfolio-agnostic: it sees series, never positions.
//!
//! # Invariants
//! - at most one of entry / exit is set on any bar
//! - the trend is defined on every bar; undefined inputs read as "off"

pub mod monotonic;
pub mod runs;
pub mod tsignals;
pub mod xsignals;

pub use monotonic::{decreasing, increasing, monotonic, Monotonic, MonotonicParams, Slope};
pub use runs::{long_run, short_run, Runs, RunsParams};
pub use tsignals::{
    tsignals, SignalMode, TrendFilter, TrendFilterParams, TrendSignals, TsignalsParams,
};
pub use xsignals::{crosses, xsignals, CrossLevels, Threshold, Xsignals, XsignalsParams};
