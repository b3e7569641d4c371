//! Pure scaling and axis remapping. No state, no failure modes.

use crate::config::ScalingConfig;
use crate::mqtt::{TwistCommand, Vector3};

/// Fixed divisor bringing raw device excursions into roughly [-1, 1].
/// Typical full deflection on the supported hardware is about ±350 counts;
/// the normalized value is unbounded in principle.
pub const HW_SCALE: f64 = 350.0;

/// Velocity scale factors applied on top of the hardware normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityScales {
    pub linear: f64,
    pub rotation: f64,
}

impl From<ScalingConfig> for VelocityScales {
    fn from(config: ScalingConfig) -> Self {
        Self {
            linear: config.linear,
            rotation: config.rotation,
        }
    }
}

/// Normalizes the six raw axes for the joystick report, order preserved.
pub fn map_joystick(axes: &[f64; 6]) -> [f64; 6] {
    axes.map(|value| value / HW_SCALE)
}

/// Remaps the raw axes into a forward/left/up body-frame twist.
///
/// The puck sits with device-z pointing forward, device-x right and
/// device-y up, so body-x is device-z, body-y is -device-x and body-z is
/// device-y; the rotational axes follow the same permutation. The mapping
/// is fixed by the mounting convention, not configurable.
pub fn map_twist(axes: &[f64; 6], scales: &VelocityScales) -> TwistCommand {
    TwistCommand {
        linear: Vector3 {
            x: axes[2] / HW_SCALE * scales.linear,
            y: -axes[0] / HW_SCALE * scales.linear,
            z: axes[1] / HW_SCALE * scales.linear,
        },
        angular: Vector3 {
            x: axes[5] / HW_SCALE * scales.rotation,
            y: axes[3] / HW_SCALE * scales.rotation,
            z: axes[4] / HW_SCALE * scales.rotation,
        },
    }
}
