//! Double-buffered per-cell state and the read-only neighbor view

use crate::core_types::{Direction, Vec2};

/// Scalar and vector fields of one grid point
///
/// `temperature`/`flow` are committed values; `pending_temperature`/
/// `pending_flow` are written by passes and become visible only on commit.
/// `divergence` and `pressure` are scratch space for a single projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellState {
    pub temperature: f32,
    pub pending_temperature: f32,
    pub flow: Vec2,
    pub pending_flow: Vec2,
    pub divergence: f32,
    pub pressure: f32,
}

impl CellState {
    /// State with both buffers set to the same values and empty scratch fields
    #[must_use]
    pub fn settled(temperature: f32, flow: Vec2) -> Self {
        Self {
            temperature,
            pending_temperature: temperature,
            flow,
            pending_flow: flow,
            divergence: 0.0,
            pressure: 0.0,
        }
    }
}

/// Copies of a cell's four neighbors, taken just before the cell is processed
///
/// A link that wraps across the edge of the domain is stored as `None`: the
/// torus wiring exists for indexing only and must never feed physics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighborhood {
    neighbors: [Option<CellState>; 4],
}

impl Neighborhood {
    #[must_use]
    pub fn new(neighbors: [Option<CellState>; 4]) -> Self {
        Self { neighbors }
    }

    /// Neighbor in `direction`, or `None` when that link leaves the domain
    #[inline]
    #[must_use]
    pub fn get(&self, direction: Direction) -> Option<&CellState> {
        self.neighbors[direction.index()].as_ref()
    }

    /// Neighbor in `direction`, mirrored onto `own` when the link leaves the domain
    #[inline]
    #[must_use]
    pub fn or_mirror<'a>(&'a self, direction: Direction, own: &'a CellState) -> &'a CellState {
        self.get(direction).unwrap_or(own)
    }

    /// Arithmetic mean of `field` over the neighbors inside the domain
    pub fn inward_mean(&self, field: impl Fn(&CellState) -> f32) -> Option<f32> {
        let mut sum = 0.0;
        let mut count = 0u8;
        for state in self.neighbors.iter().flatten() {
            sum += field(state);
            count += 1;
        }
        (count > 0).then(|| sum / f32::from(count))
    }
}
