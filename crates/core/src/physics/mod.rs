//! Physical property models feeding the relaxation coefficients

pub mod water;

pub use water::{flow_coefficient, heat_coefficient, thermal_conductivity};
