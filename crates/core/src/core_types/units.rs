//! Semantic unit types for the parameter surface
//!
//! The bath is driven in degrees Fahrenheit (a 98.6 °F body in an 80 °F tub),
//! while the water property fits are expressed in Celsius. These newtypes keep
//! the two scales from being mixed by accident.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Temperature in degrees Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Fahrenheit(f32);

impl Fahrenheit {
    /// Create a new Fahrenheit temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Fahrenheit(value)
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius((self.0 - 32.0) * 5.0 / 9.0)
    }
}

impl Deref for Fahrenheit {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°F", self.0)
    }
}

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f32);

impl Deref for Celsius {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

/// Mass density in kg/m³
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KgPerCubicMeter(f32);

impl KgPerCubicMeter {
    /// Density of water near room temperature
    pub const WATER: KgPerCubicMeter = KgPerCubicMeter(997.0);

    /// Create a new density value
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        KgPerCubicMeter(value)
    }

    /// A density can scale a coefficient only if it is finite and positive
    #[inline]
    #[must_use]
    pub fn is_physical(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl Deref for KgPerCubicMeter {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl fmt::Display for KgPerCubicMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kg/m³", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fahrenheit_to_celsius() {
        assert_relative_eq!(*Fahrenheit::new(212.0).to_celsius(), 100.0, epsilon = 1e-4);
        assert_relative_eq!(*Fahrenheit::new(32.0).to_celsius(), 0.0, epsilon = 1e-4);
        assert_relative_eq!(*Fahrenheit::new(98.6).to_celsius(), 37.0, epsilon = 1e-3);
    }

    #[test]
    fn test_density_physical() {
        assert!(KgPerCubicMeter::WATER.is_physical());
        assert!(!KgPerCubicMeter::new(0.0).is_physical());
        assert!(!KgPerCubicMeter::new(f32::NAN).is_physical());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Fahrenheit::new(80.0)), "80.0°F");
        assert_eq!(format!("{}", KgPerCubicMeter::WATER), "997.0 kg/m³");
    }
}
