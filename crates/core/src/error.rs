//! Kernel error type
//!
//! Two families of failure exist. Numerical instability (a pending value went
//! non-finite) aborts the pass in flight and is expected to halt the run, since
//! it points at an unstable coefficient or time-step choice. Out-of-bounds and
//! wiring mistakes are programming errors. Neither is retried or swallowed; the
//! pipeline surfaces both to the driver.

use crate::core_types::CellCoords;
use crate::params::ParameterChannel;
use thiserror::Error;

/// Result alias used throughout the kernel
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors raised by the grid kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("pending flow ({vx}, {vy}) at cell {at} is not finite")]
    NonFiniteFlow { at: CellCoords, vx: f32, vy: f32 },

    #[error("pending temperature {value} at cell {at} is not finite")]
    NonFiniteTemperature { at: CellCoords, value: f32 },

    #[error("source vector ({vx}, {vy}) at cell {at} is not finite after rescaling")]
    NonFiniteSourceVector { at: CellCoords, vx: f32, vy: f32 },

    #[error("cell {at} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        at: CellCoords,
        rows: usize,
        cols: usize,
    },

    #[error("slot {at} is already occupied")]
    SlotOccupied { at: CellCoords },

    #[error("cell built for {cell} cannot be placed at slot {slot}")]
    CoordinateMismatch { cell: CellCoords, slot: CellCoords },

    #[error("slot {at} is empty")]
    EmptySlot { at: CellCoords },

    #[error("grid cells have not been linked")]
    NotLinked,

    #[error("grid cells are already linked")]
    AlreadyLinked,

    #[error("cell {at} has no behavior variants")]
    NoVariants { at: CellCoords },

    #[error("grid dimensions {rows}x{cols} are invalid")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("value {value} for parameter {channel} is invalid")]
    InvalidParameter {
        channel: ParameterChannel,
        value: f32,
    },
}
