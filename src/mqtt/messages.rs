//! Typed records for the two output channels.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Joystick passthrough report, published every cycle regardless of mode.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JoyReport {
    /// Time the cycle assembled this report
    pub stamp: DateTime<Local>,
    /// Normalized axes in device order (x, y, z, rx, ry, rz)
    pub axes: [f64; 6],
    /// Last-known button states
    pub buttons: [bool; 2],
}

/// Three-component vector.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Velocity command in the forward/left/up body frame. Published only while
/// command output is enabled; while disabled the channel stays silent
/// rather than carrying zero commands.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct TwistCommand {
    pub linear: Vector3,
    pub angular: Vector3,
}
