//! Per-cell physics policies
//!
//! A closed set of behaviors a cell can run. Each variant carries its own
//! parameters and implements the subset of pass operations it needs; the rest
//! fall through as no-ops. Dispatch is a `match` per operation, so adding a
//! variant forces every pass to decide what it does with it.
//!
//! # Boundary rules
//!
//! | Variant     | temperature        | flow                                  | div / pressure        |
//! |-------------|--------------------|---------------------------------------|-----------------------|
//! | `Interior`  | implicit diffusion | implicit diffusion, projection        | Poisson relaxation    |
//! | `Edge`      | copy inward `T'`   | normal zeroed, tangential from inward | copy inward           |
//! | `Corner`    | mean of two        | mean of two                           | mean of two           |
//! | `Dirichlet` | pinned constant    | zero                                  | mean of inward links  |
//! | `Source`    | pinned constant    | rescaled inflow vector                | mean of inward links  |
//! | `Random`    | uniform noise      | untouched                             | untouched             |

use super::state::{CellState, Neighborhood};
use crate::config::DiffusionModel;
use crate::core_types::{CellCoords, Corner, Direction, Fahrenheit, KgPerCubicMeter, Side, Vec2};
use crate::error::{KernelError, Result};
use crate::params::ParameterChannel;
use crate::physics::water;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Range the diagnostic `Random` variant draws temperatures from
pub const RANDOM_TEMPERATURE_RANGE: std::ops::Range<f32> = 0.0..100.0;

/// Values every pass reads but no cell owns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassContext {
    pub grid_spacing: f32,
    pub diffusion: DiffusionModel,
}

/// Order in which cells are visited within one sweep
///
/// Field cells relax first, then walls read their inward neighbors, then
/// corners average the walls next to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SweepTier {
    Field,
    Boundary,
    Corner,
}

impl SweepTier {
    pub const ALL: [SweepTier; 3] = [SweepTier::Field, SweepTier::Boundary, SweepTier::Corner];
}

/// Inflow boundary, e.g. a faucet cell
///
/// The pour direction is fixed at construction; only its length follows the
/// speed channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceInflow {
    temperature: f32,
    direction: Vec2,
    flow: Vec2,
}

impl SourceInflow {
    #[must_use]
    pub fn new(temperature: f32, direction: Vec2) -> Self {
        Self {
            temperature,
            direction,
            flow: direction,
        }
    }

    /// Same inflow with the pour direction already rescaled to `speed`
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.set_speed(speed);
        self
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Current inflow vector
    pub fn flow(&self) -> Vec2 {
        self.flow
    }

    /// Rescale the pour direction to `speed`
    pub fn set_speed(&mut self, speed: f32) {
        self.flow = rescale(self.direction, speed);
    }
}

/// Scale `vector` to length `length`; a zero-length vector comes back unchanged
#[must_use]
pub fn rescale(vector: Vec2, length: f32) -> Vec2 {
    vector
        .try_normalize(0.0)
        .map_or(vector, |unit| unit * length)
}

/// Behavior policy of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    /// General fluid/heat cell
    Interior { water_density: KgPerCubicMeter },
    /// Zero-gradient wall on one side of the bath
    Edge(Side),
    /// Corner of the bath, averaging its two wall neighbors
    Corner(Corner),
    /// Fixed-temperature wall with no flow through it
    Dirichlet { temperature: f32 },
    /// Inflow boundary
    Source(SourceInflow),
    /// Diagnostic noise; carries no physical meaning
    Random,
}

impl Variant {
    #[must_use]
    pub fn interior() -> Self {
        Variant::Interior {
            water_density: KgPerCubicMeter::WATER,
        }
    }

    #[must_use]
    pub fn dirichlet(temperature: f32) -> Self {
        Variant::Dirichlet { temperature }
    }

    #[must_use]
    pub fn source(temperature: f32, direction: Vec2) -> Self {
        Variant::Source(SourceInflow::new(temperature, direction))
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Variant::Interior { .. } => "interior",
            Variant::Edge(_) => "edge",
            Variant::Corner(_) => "corner",
            Variant::Dirichlet { .. } => "dirichlet",
            Variant::Source(_) => "source",
            Variant::Random => "random",
        }
    }

    /// Parameter channels this variant listens to
    #[must_use]
    pub const fn interests(&self) -> &'static [ParameterChannel] {
        match self {
            Variant::Interior { .. } => &[ParameterChannel::WaterDensity],
            Variant::Dirichlet { .. } => &[ParameterChannel::BodyTemp],
            Variant::Source(_) => &[
                ParameterChannel::SourceTemp,
                ParameterChannel::SourceFlowSpeed,
            ],
            Variant::Edge(_) | Variant::Corner(_) | Variant::Random => &[],
        }
    }

    /// Take the latest value of a channel this variant declared interest in
    pub fn apply_parameter(&mut self, channel: ParameterChannel, value: f32) {
        match (self, channel) {
            (Variant::Interior { water_density }, ParameterChannel::WaterDensity) => {
                *water_density = KgPerCubicMeter::new(value);
            }
            (Variant::Dirichlet { temperature }, ParameterChannel::BodyTemp) => {
                *temperature = value;
            }
            (Variant::Source(inflow), ParameterChannel::SourceTemp) => {
                inflow.temperature = value;
            }
            (Variant::Source(inflow), ParameterChannel::SourceFlowSpeed) => {
                inflow.set_speed(value);
            }
            _ => {}
        }
    }

    pub const fn sweep_tier(&self) -> SweepTier {
        match self {
            Variant::Interior { .. } => SweepTier::Field,
            Variant::Corner(_) => SweepTier::Corner,
            Variant::Edge(_) | Variant::Dirichlet { .. } | Variant::Source(_) | Variant::Random => {
                SweepTier::Boundary
            }
        }
    }

    pub const fn should_advect(&self) -> bool {
        matches!(self, Variant::Interior { .. })
    }

    pub const fn should_advect_flow(&self) -> bool {
        matches!(self, Variant::Interior { .. })
    }

    /// Write the pending values a variant imposes at the start of the heat step.
    ///
    /// # Errors
    ///
    /// [`KernelError::NonFiniteSourceVector`] when a source's rescaled inflow
    /// vector is not finite.
    pub fn update(&self, at: CellCoords, state: &mut CellState) -> Result<()> {
        match self {
            Variant::Dirichlet { temperature } => {
                state.pending_temperature = *temperature;
                state.pending_flow = Vec2::zeros();
            }
            Variant::Source(inflow) => {
                let flow = inflow.flow;
                if !(flow.x.is_finite() && flow.y.is_finite()) {
                    return Err(KernelError::NonFiniteSourceVector {
                        at,
                        vx: flow.x,
                        vy: flow.y,
                    });
                }
                state.pending_temperature = inflow.temperature;
                state.pending_flow = flow;
            }
            Variant::Random => {
                state.pending_temperature = rand::rng().random_range(RANDOM_TEMPERATURE_RANGE);
            }
            Variant::Interior { .. } | Variant::Edge(_) | Variant::Corner(_) => {}
        }
        Ok(())
    }

    /// One in-place relaxation sweep of implicit heat diffusion
    pub fn diffuse(&self, state: &mut CellState, hood: &Neighborhood, ctx: &PassContext) {
        if let Variant::Interior { water_density } = self {
            let a = water::heat_coefficient(
                ctx.diffusion,
                Fahrenheit::new(state.temperature),
                *water_density,
            );
            let own = state.pending_temperature;
            let neighbors: f32 = Direction::ALL
                .iter()
                .map(|&dir| hood.get(dir).map_or(own, |n| n.pending_temperature))
                .sum();
            state.pending_temperature = (state.temperature + a * neighbors) / (1.0 + 4.0 * a);
        }
    }

    /// One in-place relaxation sweep of implicit flow diffusion (viscosity)
    pub fn diffuse_flow(&self, state: &mut CellState, hood: &Neighborhood, ctx: &PassContext) {
        if let Variant::Interior { water_density } = self {
            let b = water::flow_coefficient(ctx.diffusion, *water_density);
            let own = state.pending_flow;
            let neighbors: Vec2 = Direction::ALL
                .iter()
                .map(|&dir| hood.get(dir).map_or(own, |n| n.pending_flow))
                .sum();
            state.pending_flow = (state.flow + neighbors * b) / (1.0 + 4.0 * b);
        }
    }

    /// Temperature boundary condition for cells that do not advect
    pub fn set_boundary(&self, state: &mut CellState, hood: &Neighborhood) {
        match self {
            Variant::Edge(side) => {
                state.pending_temperature =
                    hood.or_mirror(side.inward(), state).pending_temperature;
            }
            Variant::Corner(corner) => {
                state.pending_temperature = corner_mean(*corner, hood, state, |s| {
                    s.pending_temperature
                });
            }
            Variant::Dirichlet { temperature } => state.pending_temperature = *temperature,
            Variant::Source(inflow) => state.pending_temperature = inflow.temperature,
            Variant::Interior { .. } | Variant::Random => {}
        }
    }

    /// Flow boundary condition for cells that do not advect
    pub fn set_flow_boundary(&self, state: &mut CellState, hood: &Neighborhood) {
        match self {
            Variant::Edge(side) => {
                let inward = hood.or_mirror(side.inward(), state).pending_flow;
                state.pending_flow = if side.is_horizontal() {
                    Vec2::new(inward.x, 0.0)
                } else {
                    Vec2::new(0.0, inward.y)
                };
            }
            Variant::Corner(corner) => {
                let [first, second] = corner.inward();
                let a = hood.or_mirror(first, state).pending_flow;
                let b = hood.or_mirror(second, state).pending_flow;
                state.pending_flow = (a + b) * 0.5;
            }
            Variant::Dirichlet { .. } => state.pending_flow = Vec2::zeros(),
            Variant::Source(inflow) => state.pending_flow = inflow.flow,
            Variant::Interior { .. } | Variant::Random => {}
        }
    }

    /// Divergence of the pending flow; also clears the pressure guess
    pub fn calculate_div(&self, state: &mut CellState, hood: &Neighborhood, ctx: &PassContext) {
        match self {
            Variant::Interior { .. } => {
                let east = hood.or_mirror(Direction::East, state).pending_flow.x;
                let west = hood.or_mirror(Direction::West, state).pending_flow.x;
                let south = hood.or_mirror(Direction::South, state).pending_flow.y;
                let north = hood.or_mirror(Direction::North, state).pending_flow.y;
                state.divergence = -0.5 * ctx.grid_spacing * ((east - west) + (south - north));
                state.pressure = 0.0;
            }
            Variant::Edge(side) => {
                let inward = *hood.or_mirror(side.inward(), state);
                state.divergence = inward.divergence;
                state.pressure = inward.pressure;
            }
            Variant::Corner(corner) => {
                state.divergence = corner_mean(*corner, hood, state, |s| s.divergence);
                state.pressure = corner_mean(*corner, hood, state, |s| s.pressure);
            }
            Variant::Dirichlet { .. } | Variant::Source(_) => {
                state.divergence = hood.inward_mean(|s| s.divergence).unwrap_or(0.0);
                state.pressure = hood.inward_mean(|s| s.pressure).unwrap_or(0.0);
            }
            Variant::Random => {}
        }
    }

    /// One in-place relaxation sweep of the pressure Poisson equation
    pub fn calculate_p(&self, state: &mut CellState, hood: &Neighborhood) {
        match self {
            Variant::Interior { .. } => {
                let own = state.pressure;
                let neighbors: f32 = Direction::ALL
                    .iter()
                    .map(|&dir| hood.get(dir).map_or(own, |n| n.pressure))
                    .sum();
                state.pressure = (state.divergence + neighbors) / 4.0;
            }
            Variant::Edge(side) => {
                state.pressure = hood.or_mirror(side.inward(), state).pressure;
            }
            Variant::Corner(corner) => {
                state.pressure = corner_mean(*corner, hood, state, |s| s.pressure);
            }
            Variant::Dirichlet { .. } | Variant::Source(_) => {
                state.pressure = hood.inward_mean(|s| s.pressure).unwrap_or(0.0);
            }
            Variant::Random => {}
        }
    }

    /// Subtract the pressure gradient so the pending flow loses its divergence
    pub fn correct_flow(&self, state: &mut CellState, hood: &Neighborhood, ctx: &PassContext) {
        match self {
            Variant::Interior { .. } => {
                let h = ctx.grid_spacing;
                let east = hood.or_mirror(Direction::East, state).pressure;
                let west = hood.or_mirror(Direction::West, state).pressure;
                let south = hood.or_mirror(Direction::South, state).pressure;
                let north = hood.or_mirror(Direction::North, state).pressure;
                state.pending_flow.x -= 0.5 * (east - west) / h;
                state.pending_flow.y -= 0.5 * (south - north) / h;
            }
            Variant::Edge(_)
            | Variant::Corner(_)
            | Variant::Dirichlet { .. }
            | Variant::Source(_) => self.set_flow_boundary(state, hood),
            Variant::Random => {}
        }
    }

    /// Variant-specific part of a cell reset, run after the cell restored its
    /// recorded initial values
    pub fn reset(&self, state: &mut CellState) {
        match self {
            Variant::Dirichlet { temperature } => {
                state.pending_temperature = *temperature;
                state.pending_flow = Vec2::zeros();
            }
            Variant::Source(inflow) => {
                state.pending_temperature = inflow.temperature;
                state.pending_flow = inflow.flow;
            }
            Variant::Interior { .. } | Variant::Edge(_) | Variant::Corner(_) | Variant::Random => {}
        }
    }
}

/// Mean of `field` over a corner's two edge-facing neighbors
fn corner_mean(
    corner: Corner,
    hood: &Neighborhood,
    own: &CellState,
    field: impl Fn(&CellState) -> f32,
) -> f32 {
    let [first, second] = corner.inward();
    (field(hood.or_mirror(first, own)) + field(hood.or_mirror(second, own))) * 0.5
}
