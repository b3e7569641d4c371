//! Command-output toggle driven by button press edges.

use tracing::info;

use super::accumulator::EventOutcome;

/// Index of the button that toggles velocity output. Button 0 is pure
/// passthrough and consumed by no control logic.
pub const MODE_TOGGLE_BUTTON: usize = 1;

/// Whether velocity commands are currently published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// A velocity command goes out every cycle.
    #[default]
    CommandEnabled,
    /// Velocity output suppressed; joystick passthrough continues.
    CommandDisabled,
}

impl OutputMode {
    /// Applies one cycle's edge observation to the mode.
    ///
    /// Flips only when the cycle carried a button edge and the toggle
    /// button is in the pressed state. A release edge leaves the mode
    /// alone, so one physical press cannot toggle twice.
    #[must_use]
    pub fn evaluate(self, buttons: &[bool; 2], outcome: EventOutcome) -> Self {
        if !(outcome.button_edge && buttons[MODE_TOGGLE_BUTTON]) {
            return self;
        }
        match self {
            Self::CommandEnabled => {
                info!("disabled twist output");
                Self::CommandDisabled
            }
            Self::CommandDisabled => {
                info!("enabled twist output");
                Self::CommandEnabled
            }
        }
    }

    pub fn command_enabled(self) -> bool {
        self == Self::CommandEnabled
    }
}
