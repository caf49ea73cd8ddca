//! Kernel and scenario configuration
//!
//! Defaults reproduce the hot-bath animation: a 40x100 tub of 80 °F water, a
//! faucet row along the top pouring 100 °F water downwards at unit speed, and
//! a 98.6 °F body that can be dropped into any interior cell.

use crate::core_types::{Fahrenheit, KgPerCubicMeter, Vec2};
use crate::params::{ParameterChannel, ParameterSnapshot};
use serde::{Deserialize, Serialize};

/// How the interior diffusion coefficients are derived each sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DiffusionModel {
    /// Coefficients follow live water properties.
    ///
    /// `a = thermal_time_scale · k(T) / (ρ · c_p)` and
    /// `b = viscous_time_scale · μ / ρ`, where the time scales fold the tick
    /// length and squared grid spacing into one factor.
    Water {
        thermal_time_scale: f32,
        viscous_time_scale: f32,
    },
    /// Fixed coefficients, independent of temperature and density
    Constant { heat: f32, flow: f32 },
}

impl Default for DiffusionModel {
    fn default() -> Self {
        DiffusionModel::Water {
            // a ≈ 0.25 for 80 °F water at 997 kg/m³
            thermal_time_scale: 1.75e6,
            // b ≈ 0.09 at 997 kg/m³
            viscous_time_scale: 1.0e5,
        }
    }
}

/// Numerical settings of the grid kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Relaxation sweeps per `diffuse` / `diffuse_flow` pass
    pub diffusion_sweeps: usize,
    /// Pressure relaxation sweeps per `project` pass
    pub pressure_sweeps: usize,
    /// Fixed grid spacing `h` used by the divergence and gradient stencils
    pub grid_spacing: f32,
    /// Coefficient model for heat and flow diffusion
    pub diffusion: DiffusionModel,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            diffusion_sweeps: 20,
            pressure_sweeps: 20,
            grid_spacing: 1.0,
            diffusion: DiffusionModel::default(),
        }
    }
}

/// Layout and starting parameters of the hot-bath scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubConfig {
    pub rows: usize,
    pub cols: usize,
    pub source_flow_speed: f32,
    pub source_temp: Fahrenheit,
    pub tub_temp: Fahrenheit,
    pub body_temp: Fahrenheit,
    pub water_density: KgPerCubicMeter,
    /// Direction the faucet row pours in; rescaled to `source_flow_speed`
    pub source_direction: Vec2,
    pub kernel: KernelConfig,
}

impl Default for TubConfig {
    fn default() -> Self {
        Self {
            rows: 40,
            cols: 100,
            source_flow_speed: 1.0,
            source_temp: Fahrenheit::new(100.0),
            tub_temp: Fahrenheit::new(80.0),
            body_temp: Fahrenheit::new(98.6),
            water_density: KgPerCubicMeter::WATER,
            source_direction: Vec2::new(0.0, 1.0),
            kernel: KernelConfig::default(),
        }
    }
}

impl TubConfig {
    /// Parameter values the scenario starts from
    #[must_use]
    pub fn initial_parameters(&self) -> ParameterSnapshot {
        ParameterSnapshot::default()
            .with(ParameterChannel::SourceFlowSpeed, self.source_flow_speed)
            .with(ParameterChannel::SourceTemp, *self.source_temp)
            .with(ParameterChannel::TubTemp, *self.tub_temp)
            .with(ParameterChannel::BodyTemp, *self.body_temp)
            .with(ParameterChannel::WaterDensity, *self.water_density)
    }
}
