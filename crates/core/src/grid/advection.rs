//! Semi-Lagrangian advection helpers
//!
//! A cell's new value is the committed field sampled at the point its flow
//! vector came from. The backtrace is clamped so that all four lattice points
//! around the sample exist; with zero flow the sample lands exactly on an
//! interior cell and returns its own value. A cell on the border row or column
//! is pulled half a cell inward, so walls take their values from their
//! boundary rule rather than from advection.

use crate::core_types::{CellCoords, Vec2};
use std::ops::{Add, Mul};

/// Lowest sample coordinate along either axis
const CLAMP_MARGIN: f32 = 0.5;

/// Point `(x, y)` the flow at `coords` carried its value from
///
/// `x` runs along columns and `y` along rows, matching `flow = (vx, vy)`.
/// Both are clamped to `[0.5, (n - 1) - 0.5]`, so zero flow maps a cell
/// onto itself only when it sits at [`crate::Placement::Interior`].
pub fn backtrace(coords: CellCoords, flow: Vec2, rows: usize, cols: usize) -> (f32, f32) {
    let x = coords.col as f32 - flow.x;
    let y = coords.row as f32 - flow.y;
    (clamp_axis(x, cols), clamp_axis(y, rows))
}

fn clamp_axis(value: f32, extent: usize) -> f32 {
    let upper = (extent as f32 - 1.0 - CLAMP_MARGIN).max(CLAMP_MARGIN);
    value.clamp(CLAMP_MARGIN, upper)
}

/// Bilinear interpolation of a row-major `field` at `(x, y)`
pub fn sample<T>(field: &[T], rows: usize, cols: usize, x: f32, y: f32) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let i0 = x.floor() as usize;
    let j0 = y.floor() as usize;
    let i1 = (i0 + 1).min(cols - 1);
    let j1 = (j0 + 1).min(rows - 1);

    let s1 = x - i0 as f32;
    let s0 = 1.0 - s1;
    let t1 = y - j0 as f32;
    let t0 = 1.0 - t1;

    let at = |row: usize, col: usize| field[row * cols + col];
    (at(j0, i0) * t0 + at(j1, i0) * t1) * s0 + (at(j0, i1) * t0 + at(j1, i1) * t1) * s1
}
