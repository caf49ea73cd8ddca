//! Core types and utilities

pub mod placement;
pub mod units;
pub mod vec2;

pub use placement::{CellCoords, Corner, Direction, Placement, Side};
pub use units::{Celsius, Fahrenheit, KgPerCubicMeter};
pub use vec2::Vec2;
