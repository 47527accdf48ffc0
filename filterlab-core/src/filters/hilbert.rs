//! Hilbert-transform homodyne discriminator.
//!
//! Estimates the dominant cycle period and the cycle phase of a price series
//! one bar at a time. Shared by MAMA and the instantaneous trendline.

use std::f64::consts::PI;

use crate::series::Lags;

const A: f64 = 0.0962;
const B: f64 = 0.5769;
const MIN_PERIOD: f64 = 6.0;
const MAX_PERIOD: f64 = 50.0;

/// Bars of price history one update reads (current bar plus three lags).
pub const WINDOW: usize = 4;

/// Discriminator output for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Smoothed dominant cycle period, always within [6, 50] for finite input.
    pub period: f64,
    /// Period smoothed a second time (0.33 / 0.67).
    pub smooth_period: f64,
    /// Cycle phase in degrees.
    pub phase: f64,
    /// Phase change since the previous bar, floored at 1 degree.
    pub delta_phase: f64,
}

/// Four-tap Hilbert FIR applied to lags 0, 2, 4, 6.
fn hilbert(x: &Lags<7>) -> f64 {
    A * x.get(0) + B * x.get(2) - B * x.get(4) - A * x.get(6)
}

#[derive(Debug, Clone)]
pub(crate) struct HilbertDiscriminator {
    smooth: Lags<7>,
    detrender: Lags<7>,
    i1: Lags<7>,
    q1: Lags<7>,
    i2: f64,
    q2: f64,
    re: f64,
    im: f64,
    period: f64,
    smooth_period: f64,
    phase: f64,
}

impl HilbertDiscriminator {
    pub fn new() -> Self {
        Self {
            smooth: Lags::new(),
            detrender: Lags::new(),
            i1: Lags::new(),
            q1: Lags::new(),
            i2: 0.0,
            q2: 0.0,
            re: 0.0,
            im: 0.0,
            period: MIN_PERIOD,
            smooth_period: MIN_PERIOD,
            phase: 0.0,
        }
    }

    /// Advance one bar. `window` holds the last four prices, newest last.
    pub fn update(&mut self, window: &[f64; WINDOW]) -> Estimate {
        let [x3, x2, x1, x0] = *window;
        let bandwidth = 0.075 * self.period + 0.54;

        self.smooth.push(0.4 * x0 + 0.3 * x1 + 0.2 * x2 + 0.1 * x3);
        self.detrender.push(bandwidth * hilbert(&self.smooth));
        self.q1.push(bandwidth * hilbert(&self.detrender));
        self.i1.push(self.detrender.get(3));

        // Advance the phase of I1 and Q1 by 90 degrees.
        let ji = bandwidth * hilbert(&self.i1);
        let jq = bandwidth * hilbert(&self.q1);

        let i2 = 0.2 * (self.i1.get(0) - jq) + 0.8 * self.i2;
        let q2 = 0.2 * (self.q1.get(0) + ji) + 0.8 * self.q2;

        self.re = 0.2 * (i2 * self.i2 + q2 * self.q2) + 0.8 * self.re;
        self.im = 0.2 * (i2 * self.q2 - q2 * self.i2) + 0.8 * self.im;
        self.i2 = i2;
        self.q2 = q2;

        let prev_period = self.period;
        let mut period = prev_period;
        if self.im != 0.0 && self.re != 0.0 {
            period = 2.0 * PI / (self.im / self.re).atan();
        }
        period = period
            .min(1.5 * prev_period)
            .max(0.67 * prev_period)
            .clamp(MIN_PERIOD, MAX_PERIOD);
        self.period = (0.2 * period + 0.8 * prev_period).clamp(MIN_PERIOD, MAX_PERIOD);
        self.smooth_period = 0.33 * self.period + 0.67 * self.smooth_period;

        let prev_phase = self.phase;
        let i1 = self.i1.get(0);
        self.phase = if i1 != 0.0 {
            (self.q1.get(0) / i1).atan().to_degrees()
        } else {
            0.0
        };
        let delta_phase = (prev_phase - self.phase).max(1.0);

        Estimate {
            period: self.period,
            smooth_period: self.smooth_period,
            phase: self.phase,
            delta_phase,
        }
    }
}

/// The four-price window ending at index `i` (requires `i >= 3`).
pub(crate) fn window_at(prices: &[f64], i: usize) -> [f64; WINDOW] {
    [prices[i - 3], prices[i - 2], prices[i - 1], prices[i]]
}
