//! The cell grid and its pass pipeline

mod advection;
mod bath_grid;
mod pipeline;

pub use advection::{backtrace, sample};
pub use bath_grid::Grid;
pub use pipeline::Pass;
