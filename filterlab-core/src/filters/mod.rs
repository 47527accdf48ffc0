//! Fixed-structure recursive filters.

pub(crate) mod hilbert;
pub mod supersmoother;
pub mod trendline;

pub use supersmoother::{ssf, ssf3, Ssf, Ssf3, Ssf3Params, SsfParams};
pub use trendline::{ht_trendline, Trendline, TrendlineParams};
