//! Integration of polled device events into the current raw snapshot.

use tracing::{debug, warn};

use crate::device::DeviceEvent;

/// Consecutive empty polls after which the axes snap back to rest.
///
/// A tenth of a second at the 1 kHz poll rate. The device stops emitting
/// motion events entirely once it is released, so without this the last
/// displacement sample would be re-published forever.
pub const IDLE_ZERO_CYCLES: u32 = 100;

/// Per-cycle result of feeding one event into the accumulator.
///
/// Carries the button-edge observation to the mode logic by value, so the
/// edge is consumed exactly once, in the cycle it was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// True when this cycle carried a button transition.
    pub button_edge: bool,
}

/// Last-known raw device state.
///
/// Axes hold the most recent motion sample verbatim; accumulating deltas
/// instead would drift unbounded. Buttons keep their last-known state
/// indefinitely and are never idle-zeroed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateAccumulator {
    axes: [f64; 6],
    buttons: [bool; 2],
    idle_cycles: u32,
}

impl StateAccumulator {
    /// Raw axis values in wire order (x, y, z, rx, ry, rz).
    pub fn axes(&self) -> &[f64; 6] {
        &self.axes
    }

    /// Last-known button states.
    pub fn buttons(&self) -> &[bool; 2] {
        &self.buttons
    }

    /// Folds one polled event into the snapshot.
    pub fn integrate(&mut self, event: DeviceEvent) -> EventOutcome {
        match event {
            DeviceEvent::Motion(sample) => {
                self.axes = sample.as_axes();
                self.idle_cycles = 0;
                debug!("Motion sample: {:?}", self.axes);
                EventOutcome::default()
            }
            DeviceEvent::Button { index, pressed } => {
                let Some(slot) = self.buttons.get_mut(index) else {
                    warn!("Button event with index {} out of range, ignoring", index);
                    return EventOutcome::default();
                };
                *slot = pressed;
                debug!(
                    "Button {} {}",
                    index,
                    if pressed { "pressed" } else { "released" }
                );
                EventOutcome { button_edge: true }
            }
            DeviceEvent::Invalid => {
                warn!("Invalid event from device, skipping");
                EventOutcome::default()
            }
        }
    }

    /// Idle bookkeeping for cycles where the device had nothing pending.
    ///
    /// Runs instead of [`integrate`](Self::integrate), never in addition to
    /// it: an event always takes precedence over idle accounting.
    pub fn tick_idle(&mut self) {
        self.idle_cycles += 1;
        if self.idle_cycles > IDLE_ZERO_CYCLES {
            debug!("No motion for {} cycles, zeroing axes", self.idle_cycles);
            self.axes = [0.0; 6];
            self.idle_cycles = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MotionSample;

    fn motion(axes: [f64; 6]) -> DeviceEvent {
        DeviceEvent::Motion(MotionSample {
            x: axes[0],
            y: axes[1],
            z: axes[2],
            rx: axes[3],
            ry: axes[4],
            rz: axes[5],
        })
    }

    #[test]
    fn last_motion_sample_wins() {
        let mut acc = StateAccumulator::default();
        acc.integrate(motion([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        acc.integrate(motion([10.0, 20.0, 30.0, 40.0, 50.0, 60.0]));

        // Overwrite, not a sum of prior samples.
        assert_eq!(acc.axes(), &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn motion_resets_the_idle_counter() {
        let mut acc = StateAccumulator::default();
        for _ in 0..90 {
            acc.tick_idle();
        }
        acc.integrate(motion([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(acc.idle_cycles, 0);

        // The zeroing window starts over after the sample.
        for _ in 0..IDLE_ZERO_CYCLES {
            acc.tick_idle();
        }
        assert_eq!(acc.axes(), &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn axes_zero_on_the_101st_empty_poll() {
        let mut acc = StateAccumulator::default();
        acc.integrate(motion([5.0, 5.0, 5.0, 5.0, 5.0, 5.0]));

        for _ in 0..IDLE_ZERO_CYCLES {
            acc.tick_idle();
        }
        assert_eq!(acc.axes(), &[5.0; 6]);
        assert_eq!(acc.idle_cycles, IDLE_ZERO_CYCLES);

        acc.tick_idle();
        assert_eq!(acc.axes(), &[0.0; 6]);
        assert_eq!(acc.idle_cycles, 0);
    }

    #[test]
    fn long_idle_stretch_stays_zeroed() {
        let mut acc = StateAccumulator::default();
        acc.integrate(motion([350.0, 0.0, 0.0, 0.0, 0.0, 0.0]));

        for cycle in 1..=150u32 {
            acc.tick_idle();
            if cycle > IDLE_ZERO_CYCLES {
                assert_eq!(acc.axes(), &[0.0; 6], "cycle {}", cycle);
            }
        }
    }

    #[test]
    fn idleness_never_clears_buttons() {
        let mut acc = StateAccumulator::default();
        acc.integrate(DeviceEvent::Button {
            index: 1,
            pressed: true,
        });

        for _ in 0..300 {
            acc.tick_idle();
        }
        assert_eq!(acc.buttons(), &[false, true]);
    }

    #[test]
    fn button_event_updates_state_and_reports_an_edge() {
        let mut acc = StateAccumulator::default();
        let outcome = acc.integrate(DeviceEvent::Button {
            index: 0,
            pressed: true,
        });

        assert!(outcome.button_edge);
        assert_eq!(acc.buttons(), &[true, false]);
    }

    #[test]
    fn out_of_range_button_index_is_ignored() {
        let mut acc = StateAccumulator::default();
        let outcome = acc.integrate(DeviceEvent::Button {
            index: 5,
            pressed: true,
        });

        assert!(!outcome.button_edge);
        assert_eq!(acc.buttons(), &[false, false]);
    }

    #[test]
    fn invalid_event_changes_nothing() {
        let mut acc = StateAccumulator::default();
        acc.integrate(motion([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        let before = acc.clone();

        let outcome = acc.integrate(DeviceEvent::Invalid);
        assert!(!outcome.button_edge);
        assert_eq!(acc, before);
    }
}
