//! Hot Bath Simulation Core Library
//!
//! Grid kernel for a coupled heat-diffusion / incompressible-flow simulation of
//! a bathtub. A rectangular grid of cells carries double-buffered temperature
//! and flow; each cell runs one of a closed set of behavior variants (interior
//! water, walls, corners, fixed-temperature body, faucet source) and the grid
//! drives them through a fixed per-tick pipeline of passes.
//!
//! ## Per-tick pipeline
//!
//! `clear → diffuseFlow → project → commitFlow → advectFlow → project →
//! commitFlow → update → diffuse → commit → advect → commit → render`
//!
//! - Implicit diffusion by in-place relaxation sweeps
//! - Pressure projection (divergence, Poisson relaxation, gradient correction)
//! - Semi-Lagrangian advection with bilinear sampling
//! - Named parameter channels applied only at tick boundaries

// Core types and utilities
pub mod core_types;
pub mod error;

// Kernel
pub mod cell;
pub mod grid;
pub mod params;
pub mod physics;

// Scenario and driver
pub mod config;
pub mod profiler;
pub mod scenario;
pub mod simulation;

pub use cell::{Cell, CellState, Neighborhood, SourceInflow, Variant};
pub use config::{DiffusionModel, KernelConfig, TubConfig};
pub use core_types::{
    CellCoords, Corner, Direction, Fahrenheit, KgPerCubicMeter, Placement, Side, Vec2,
};
pub use error::{KernelError, Result};
pub use grid::{Grid, Pass};
pub use params::{ParameterChannel, ParameterMailbox, ParameterSnapshot};
pub use scenario::TubBuilder;
pub use simulation::{FrameObserver, HotBath, NullObserver, TickStats};
