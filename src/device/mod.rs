//! Device-side event model and the seam to the physical 3D mouse.
//!
//! The publish loop only ever talks to the device through [`DeviceSource`],
//! so the HID plumbing in [`spacemouse`] can be swapped for a scripted
//! source in tests without touching the loop.

pub mod spacemouse;

pub use spacemouse::SpaceMouse;

/// One motion sample: simultaneous translation and rotation displacement
/// since the previous sample, in device-native units (roughly ±350).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl MotionSample {
    /// Axis values in wire order (x, y, z, rx, ry, rz).
    pub fn as_axes(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
    }
}

/// A single polled device event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceEvent {
    /// Full six-axis displacement sample
    Motion(MotionSample),
    /// One button changed state
    Button { index: usize, pressed: bool },
    /// Something the backend could not decode
    Invalid,
}

/// Device errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to initialize HID backend: {0}")]
    InitializationError(String),

    #[error("No space navigator device found")]
    NotFound,

    #[error("Failed to open device: {0}")]
    OpenError(String),
}

/// Non-blocking source of device events, polled once per publish cycle.
///
/// `poll_event` must return immediately; the 1 kHz loop never waits on the
/// device. `None` means nothing was pending this cycle.
pub trait DeviceSource {
    /// Returns the next pending event, or `None` when the queue is empty.
    fn poll_event(&mut self) -> Option<DeviceEvent>;

    /// Human-readable device name for logging.
    fn name(&self) -> &str;
}
