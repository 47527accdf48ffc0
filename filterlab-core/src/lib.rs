//! FilterLab Core: stateful recursive technical-analysis indicators.
//!
//! This crate contains:
//! - Adaptive-coefficient smoothers (JMA, MAMA/FAMA, KAMA, VIDYA, HWMA, ZLMA)
//! - Fixed-structure recursive filters (SuperSmoother, Hilbert trendline)
//! - Volatility-adaptive stop engines with a ratchet invariant
//! - Trend/signal state machines (long/short runs, tsignals, xsignals)
//! - Parameter normalization, offset/fill post-processing and frame assembly
//! - A config-driven factory and an optional reference-backend seam

pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod filters;
pub mod indicator;
pub mod params;
pub mod post;
pub mod series;
pub mod signals;
pub mod smoothers;
pub mod stops;
pub mod volatility;

#[cfg(test)]
pub(crate) mod testutil;

pub use backend::{Capabilities, ReferenceBackend, ReferenceRequest};
pub use config::{ConfigError, FilterlabConfig};
pub use domain::{Bar, Category, Column, ColumnValues, Frame, PriceSource};
pub use error::{IndicatorError, Result};
pub use factory::{build_plan, create_indicator, FactoryError, IndicatorConfig, KINDS};
pub use indicator::{compute_frame, Indicator, Planned};
pub use params::{Adjustment, Normalized, ParamMap, RawValue};
pub use post::{Fill, PostProcess};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types are Send + Sync, so independent
    /// series can be processed on separate threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Frame>();
        require_sync::<Frame>();
        require_send::<Column>();
        require_sync::<Column>();

        // Parameters and config
        require_send::<Normalized<smoothers::JmaParams>>();
        require_sync::<Normalized<smoothers::JmaParams>>();
        require_send::<FilterlabConfig>();
        require_sync::<FilterlabConfig>();
        require_send::<Capabilities>();
        require_sync::<Capabilities>();

        // Outputs
        require_send::<smoothers::MamaOutput>();
        require_sync::<smoothers::MamaOutput>();
        require_send::<stops::StopOutput>();
        require_sync::<stops::StopOutput>();
        require_send::<stops::PsarOutput>();
        require_sync::<stops::PsarOutput>();
        require_send::<signals::TrendSignals>();
        require_sync::<signals::TrendSignals>();

        // Trait objects
        require_send::<Box<dyn Indicator>>();
        require_sync::<Box<dyn Indicator>>();
        require_send::<Planned>();
        require_sync::<Planned>();
        require_send::<IndicatorError>();
        require_sync::<IndicatorError>();
        require_send::<FactoryError>();
        require_sync::<FactoryError>();
    }
}
