//! Domain types for FilterLab

pub mod bar;
pub mod frame;

pub use bar::{Bar, Ohlc, PriceSource};
pub use frame::{Category, Column, ColumnValues, Frame};
