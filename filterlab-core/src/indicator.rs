//! Indicator trait and frame assembly.
//!
//! Indicators are pure functions: bar history in, named columns out. A
//! failed indicator contributes no column; the frame never holds partial
//! results.

use std::fmt;

use crate::backend::Capabilities;
use crate::domain::{Bar, Category, Column, Frame};
use crate::error::Result;
use crate::post::PostProcess;

/// Trait for indicators.
///
/// `compute` returns one or more columns, each the same length as `bars`.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on data from bar t+1 or later. Every
/// indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync + fmt::Debug {
    /// Canonical name encoding the parameters (e.g. "JMA_7_0").
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    /// Number of leading bars that are NaN (or undefined) in the primary
    /// output column.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar], caps: &Capabilities) -> Result<Vec<Column>>;
}

/// A configured indicator together with its post-processing.
#[derive(Debug)]
pub struct Planned {
    pub indicator: Box<dyn Indicator>,
    pub post: PostProcess,
}

impl Planned {
    pub fn new(indicator: Box<dyn Indicator>) -> Self {
        Self {
            indicator,
            post: PostProcess::default(),
        }
    }

    pub fn with_post(mut self, post: PostProcess) -> Self {
        self.post = post;
        self
    }
}

/// Compute every planned indicator over `bars` and collect the results.
///
/// Errors are logged at debug level and the indicator is skipped.
pub fn compute_frame(bars: &[Bar], plan: &[Planned], caps: &Capabilities) -> Frame {
    let mut frame = Frame::new(bars.iter().map(|b| b.timestamp).collect());
    for planned in plan {
        let name = planned.indicator.name();
        let columns = match planned.indicator.compute(bars, caps) {
            Ok(columns) => columns,
            Err(err) => {
                tracing::debug!(indicator = name, error = %err, "indicator skipped");
                continue;
            }
        };
        for column in columns {
            let column = planned.post.apply(column);
            let column_name = column.name.clone();
            if let Err(err) = frame.push(column) {
                tracing::debug!(indicator = name, column = %column_name, error = %err, "column dropped");
            }
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnValues;
    use crate::error::IndicatorError;
    use crate::testutil::make_bars;

    #[derive(Debug)]
    struct Doubling;

    impl Indicator for Doubling {
        fn name(&self) -> &str {
            "DOUBLE"
        }
        fn category(&self) -> Category {
            Category::Overlap
        }
        fn lookback(&self) -> usize {
            0
        }
        fn compute(&self, bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
            Ok(vec![Column::float(
                "DOUBLE",
                Category::Overlap,
                bars.iter().map(|b| b.close * 2.0).collect(),
            )])
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Indicator for Failing {
        fn name(&self) -> &str {
            "FAIL"
        }
        fn category(&self) -> Category {
            Category::Trend
        }
        fn lookback(&self) -> usize {
            0
        }
        fn compute(&self, _bars: &[Bar], _caps: &Capabilities) -> Result<Vec<Column>> {
            Err(IndicatorError::InsufficientData {
                required: 100,
                got: 3,
            })
        }
    }

    #[test]
    fn failed_indicator_contributes_no_column() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let plan = vec![Planned::new(Box::new(Failing)), Planned::new(Box::new(Doubling))];
        let frame = compute_frame(&bars, &plan, &Capabilities::native());
        assert_eq!(frame.column_names(), vec!["DOUBLE"]);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn post_processing_applies_after_compute() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let plan = vec![Planned::new(Box::new(Doubling)).with_post(PostProcess {
            offset: 1,
            fill: None,
        })];
        let frame = compute_frame(&bars, &plan, &Capabilities::native());
        match &frame.get("DOUBLE").unwrap().values {
            ColumnValues::Float(v) => {
                assert!(v[0].is_nan());
                assert_eq!(&v[1..], &[2.0, 4.0]);
            }
            other => panic!("unexpected column type: {other:?}"),
        }
    }
}
