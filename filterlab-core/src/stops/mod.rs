//! Volatility-adaptive trailing-stop engines.
//!
//! Each engine is a two-state machine (long / short). A breach of the active
//! stop flips the direction and reseeds the stop within the same bar; while
//! the direction holds, the stop only moves in the trade's favor.

pub mod atr_trailing;
pub mod chandelier;
pub mod psar;
pub mod supertrend;

use serde::Serialize;

use crate::domain::{Category, Column};

pub use atr_trailing::{atr_trailing_stop, AtrTrailing, AtrTrailingParams};
pub use chandelier::{chandelier_exit, Chandelier, ChandelierParams};
pub use psar::{psar, Psar, PsarOutput, PsarParams};
pub use supertrend::{supertrend, Supertrend, SupertrendParams};

/// Directional bias of a stop engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

/// Starting direction from the first two bars: short when the down-move
/// (`low[0] - low[1]`) is positive and dominates the up-move
/// (`high[1] - high[0]`), long otherwise.
pub fn initial_direction(high: &[f64], low: &[f64]) -> Direction {
    if high.len() < 2 || low.len() < 2 {
        return Direction::Long;
    }
    let up = high[1] - high[0];
    let down = low[0] - low[1];
    if down > up.max(0.0) {
        Direction::Short
    } else {
        Direction::Long
    }
}

/// Stop level that may tighten but never loosen.
///
/// Long stops can only rise, short stops can only fall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratchet {
    direction: Direction,
    level: f64,
}

impl Ratchet {
    pub fn new(direction: Direction, level: f64) -> Self {
        Self { direction, level }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Offer a new level; returns the level in force afterwards. A NaN
    /// proposal keeps the current level.
    pub fn apply(&mut self, proposed: f64) -> f64 {
        if self.level.is_nan() {
            self.level = proposed;
        } else if !proposed.is_nan() {
            self.level = match self.direction {
                Direction::Long => self.level.max(proposed),
                Direction::Short => self.level.min(proposed),
            };
        }
        self.level
    }

    /// Flip the direction and reseed at `level`, unconditionally.
    pub fn reverse(&mut self, level: f64) {
        self.direction = self.direction.flip();
        self.level = level;
    }
}

/// Per-bar output common to every stop engine.
#[derive(Debug, Clone, PartialEq)]
pub struct StopOutput {
    /// Stop while long, NaN otherwise.
    pub long: Vec<f64>,
    /// Stop while short, NaN otherwise.
    pub short: Vec<f64>,
    /// `None` during warm-up.
    pub direction: Vec<Option<Direction>>,
}

impl StopOutput {
    pub fn new(len: usize) -> Self {
        Self {
            long: vec![f64::NAN; len],
            short: vec![f64::NAN; len],
            direction: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.direction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direction.is_empty()
    }

    /// Record the state at bar `i`.
    pub fn set(&mut self, i: usize, direction: Direction, level: f64) {
        self.direction[i] = Some(direction);
        match direction {
            Direction::Long => self.long[i] = level,
            Direction::Short => self.short[i] = level,
        }
    }

    /// The active stop at each bar, whichever side it is on.
    pub fn active(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| match self.direction[i] {
                Some(Direction::Long) => self.long[i],
                Some(Direction::Short) => self.short[i],
                None => f64::NAN,
            })
            .collect()
    }

    /// Direction as +1 / -1, NaN during warm-up.
    pub fn direction_values(&self) -> Vec<f64> {
        self.direction
            .iter()
            .map(|d| d.map_or(f64::NAN, |d| d.sign() as f64))
            .collect()
    }

    /// Long, short and direction columns named `{long}{suffix}` etc.
    pub(crate) fn into_columns(
        self,
        names: [&str; 3],
        suffix: &str,
        category: Category,
    ) -> Vec<Column> {
        let direction = self.direction_values();
        let [long, short, dir] = names;
        vec![
            Column::float(format!("{long}{suffix}"), category, self.long),
            Column::float(format!("{short}{suffix}"), category, self.short),
            Column::float(format!("{dir}{suffix}"), category, direction),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_ratchet_only_rises() {
        let mut r = Ratchet::new(Direction::Long, 95.0);
        assert_eq!(r.apply(100.0), 100.0);
        assert_eq!(r.apply(90.0), 100.0);
        assert_eq!(r.apply(f64::NAN), 100.0);
    }

    #[test]
    fn short_ratchet_only_falls() {
        let mut r = Ratchet::new(Direction::Short, 105.0);
        assert_eq!(r.apply(100.0), 100.0);
        assert_eq!(r.apply(110.0), 100.0);
    }

    #[test]
    fn reverse_reseeds() {
        let mut r = Ratchet::new(Direction::Long, 95.0);
        r.reverse(120.0);
        assert_eq!(r.direction(), Direction::Short);
        assert_eq!(r.apply(125.0), 120.0);
    }

    #[test]
    fn uninitialized_ratchet_takes_first_level() {
        let mut r = Ratchet::new(Direction::Long, f64::NAN);
        assert_eq!(r.apply(42.0), 42.0);
    }

    #[test]
    fn initial_direction_heuristic() {
        // down-move 2 > up-move 0
        assert_eq!(initial_direction(&[10.0, 9.5], &[9.0, 7.0]), Direction::Short);
        // up-move dominates
        assert_eq!(initial_direction(&[10.0, 13.0], &[9.0, 8.0]), Direction::Long);
        // no data
        assert_eq!(initial_direction(&[10.0], &[9.0]), Direction::Long);
    }

    #[test]
    fn output_splits_by_side() {
        let mut out = StopOutput::new(3);
        out.set(1, Direction::Long, 9.0);
        out.set(2, Direction::Short, 11.0);
        assert!(out.long[0].is_nan() && out.short[0].is_nan());
        assert_eq!(out.long[1], 9.0);
        assert!(out.short[1].is_nan());
        assert_eq!(out.short[2], 11.0);
        let dir = out.direction_values();
        assert!(dir[0].is_nan());
        assert_eq!(&dir[1..], &[1.0, -1.0]);
        let active = out.active();
        assert_eq!(&active[1..], &[9.0, 11.0]);
    }
}
