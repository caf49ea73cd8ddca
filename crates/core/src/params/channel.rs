use serde::{Deserialize, Serialize};
use std::fmt;

/// Named scalar channels the driver can push into the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParameterChannel {
    /// Speed the inflow sources rescale their direction vector to
    SourceFlowSpeed,
    /// Temperature of the inflow (°F)
    SourceTemp,
    /// Starting temperature of the bath, restored on reset (°F)
    TubTemp,
    /// Temperature a body held at a fixed-temperature wall (°F)
    BodyTemp,
    /// Ambient water density (kg/m³)
    WaterDensity,
}

impl ParameterChannel {
    /// All channels in broadcast order
    pub const ALL: [ParameterChannel; 5] = [
        ParameterChannel::SourceFlowSpeed,
        ParameterChannel::SourceTemp,
        ParameterChannel::TubTemp,
        ParameterChannel::BodyTemp,
        ParameterChannel::WaterDensity,
    ];

    /// Wire-style name used in logs and error messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ParameterChannel::SourceFlowSpeed => "sourceFlowSpeed",
            ParameterChannel::SourceTemp => "sourceTemp",
            ParameterChannel::TubTemp => "tubTemp",
            ParameterChannel::BodyTemp => "bodyTemp",
            ParameterChannel::WaterDensity => "waterDensity",
        }
    }

    /// Whether `value` may be fed into this channel
    #[must_use]
    pub fn accepts(self, value: f32) -> bool {
        match self {
            ParameterChannel::WaterDensity => value.is_finite() && value > 0.0,
            ParameterChannel::SourceFlowSpeed
            | ParameterChannel::SourceTemp
            | ParameterChannel::TubTemp
            | ParameterChannel::BodyTemp => value.is_finite(),
        }
    }
}

impl fmt::Display for ParameterChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
