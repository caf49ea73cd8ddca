//! Water properties driving the diffusion coefficients
//!
//! The interior relaxation needs a heat coefficient `a = f(T, ρ)` and a flow
//! coefficient `b = f(ρ)`. Both are dimensionless numbers of the implicit
//! scheme; they are built from real water properties and a time scale that
//! absorbs `dt / h²`.
//!
//! # References
//! - Ramires, M.L.V. et al. (1995). "Standard Reference Data for the Thermal
//!   Conductivity of Water." J. Phys. Chem. Ref. Data 24(3). Linear fit over 0–100 °C.

use crate::config::DiffusionModel;
use crate::core_types::{Fahrenheit, KgPerCubicMeter};

/// Specific heat of liquid water (J/(kg·K))
pub const SPECIFIC_HEAT_WATER: f32 = 4186.0;

/// Dynamic viscosity of water near 25 °C (Pa·s)
pub const DYNAMIC_VISCOSITY_WATER: f32 = 8.9e-4;

/// Thermal conductivity of water at the given temperature (W/(m·K))
///
/// Clamped to the 0–100 °C range the fit was made over.
#[must_use]
pub fn thermal_conductivity(temperature: Fahrenheit) -> f32 {
    let celsius = temperature.to_celsius().clamp(0.0, 100.0);
    0.561 + 0.00118 * celsius
}

/// Heat diffusion coefficient `a` for a cell at `temperature`
///
/// Never negative: a non-physical density disables diffusion instead.
#[must_use]
pub fn heat_coefficient(
    model: DiffusionModel,
    temperature: Fahrenheit,
    density: KgPerCubicMeter,
) -> f32 {
    match model {
        DiffusionModel::Constant { heat, .. } => heat.max(0.0),
        DiffusionModel::Water {
            thermal_time_scale, ..
        } => {
            if !density.is_physical() || !temperature.is_finite() {
                return 0.0;
            }
            let diffusivity = thermal_conductivity(temperature) / (*density * SPECIFIC_HEAT_WATER);
            (thermal_time_scale * diffusivity).max(0.0)
        }
    }
}

/// Flow (viscous) diffusion coefficient `b`
#[must_use]
pub fn flow_coefficient(model: DiffusionModel, density: KgPerCubicMeter) -> f32 {
    match model {
        DiffusionModel::Constant { flow, .. } => flow.max(0.0),
        DiffusionModel::Water {
            viscous_time_scale, ..
        } => {
            if !density.is_physical() {
                return 0.0;
            }
            (viscous_time_scale * DYNAMIC_VISCOSITY_WATER / *density).max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_heat_coefficient_near_quarter() {
        let a = heat_coefficient(
            DiffusionModel::default(),
            Fahrenheit::new(80.0),
            KgPerCubicMeter::WATER,
        );
        assert!(a > 0.2 && a < 0.3, "a = {a}");
    }

    #[test]
    fn test_heat_coefficient_tracks_temperature_and_density() {
        let model = DiffusionModel::default();
        let cool = heat_coefficient(model, Fahrenheit::new(60.0), KgPerCubicMeter::WATER);
        let hot = heat_coefficient(model, Fahrenheit::new(180.0), KgPerCubicMeter::WATER);
        assert!(hot > cool, "warmer water conducts better");

        let dense = heat_coefficient(model, Fahrenheit::new(80.0), KgPerCubicMeter::new(1200.0));
        let light = heat_coefficient(model, Fahrenheit::new(80.0), KgPerCubicMeter::new(800.0));
        assert!(light > dense, "lighter water diffuses faster");
    }

    #[test]
    fn test_non_physical_density_disables_diffusion() {
        let model = DiffusionModel::default();
        assert_eq!(
            heat_coefficient(model, Fahrenheit::new(80.0), KgPerCubicMeter::new(0.0)),
            0.0
        );
        assert_eq!(flow_coefficient(model, KgPerCubicMeter::new(-5.0)), 0.0);
    }

    #[test]
    fn test_constant_model_ignores_properties() {
        let model = DiffusionModel::Constant {
            heat: 0.25,
            flow: 0.1,
        };
        assert_relative_eq!(
            heat_coefficient(model, Fahrenheit::new(212.0), KgPerCubicMeter::new(1.0)),
            0.25
        );
        assert_relative_eq!(flow_coefficient(model, KgPerCubicMeter::WATER), 0.1);
    }

    #[test]
    fn test_conductivity_fit_endpoints() {
        assert_relative_eq!(thermal_conductivity(Fahrenheit::new(32.0)), 0.561, epsilon = 1e-4);
        assert_relative_eq!(thermal_conductivity(Fahrenheit::new(212.0)), 0.679, epsilon = 1e-4);
    }
}
