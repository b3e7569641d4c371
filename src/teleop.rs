//! Fixed-rate publish loop tying device, state, mapping and transport
//! together.
//!
//! # State Machine
//!
//! ```text
//! Initializing ──► Publishing
//! ```
//!
//! # Architecture
//!
//! ```text
//! DeviceSource ──► StateAccumulator ──► OutputMode
//!                        │                  │
//!                   [Scaler/Mapper]    (gates twist)
//!                        ▼                  ▼
//!                  JoyReport ─────► CommandSink ◄── TwistCommand
//! ```
//!
//! One cycle per millisecond: poll the device, fold the event into the
//! snapshot (or do idle bookkeeping), evaluate the mode toggle, then
//! publish. The joystick report goes out every cycle; the twist only while
//! command output is enabled (an absent command, not a zero one, when it
//! is not). Per-cycle faults are logged and never break the loop.

use chrono::Local;
use statum::{machine, state};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TeleopConfig;
use crate::device::DeviceSource;
use crate::mapping::{map_joystick, map_twist, VelocityScales};
use crate::mqtt::{CommandSink, JoyReport};
use crate::state::{EventOutcome, OutputMode, StateAccumulator};

/// Device polls (and publish cycles) per second.
pub const POLL_RATE_HZ: u64 = 1000;

/// States for the teleop node lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum TeleopState {
    Initializing,
    Publishing,
}

/// Publish-loop node with compile-time state safety via statum.
///
/// Owns every piece of mutable state in the pipeline; the loop body is the
/// only writer, so one cycle is strictly poll → integrate → mode → map →
/// publish with nothing to lock.
#[machine]
pub struct TeleopNode<S: TeleopState> {
    device: Box<dyn DeviceSource>,
    sink: Box<dyn CommandSink>,
    accumulator: StateAccumulator,
    mode: OutputMode,
    scales: VelocityScales,
}

impl TeleopNode<Initializing> {
    pub fn create(
        device: Box<dyn DeviceSource>,
        sink: Box<dyn CommandSink>,
        config: &TeleopConfig,
    ) -> Self {
        info!("Initializing teleop node");
        Self::new(
            device,
            sink,
            StateAccumulator::default(),
            OutputMode::default(),
            VelocityScales::from(config.scaling),
        )
    }

    /// Transitions to the Publishing state.
    pub fn initialize(self) -> TeleopNode<Publishing> {
        info!(
            "Teleop node ready: polling '{}' at {} Hz",
            self.device.name(),
            POLL_RATE_HZ
        );
        self.transition()
    }
}

impl TeleopNode<Publishing> {
    /// Runs one poll/process/publish cycle.
    fn run_cycle(&mut self) {
        // An event, if present, takes precedence over idle bookkeeping.
        let outcome = match self.device.poll_event() {
            Some(event) => self.accumulator.integrate(event),
            None => {
                self.accumulator.tick_idle();
                EventOutcome::default()
            }
        };

        self.mode = self.mode.evaluate(self.accumulator.buttons(), outcome);

        let report = JoyReport {
            stamp: Local::now(),
            axes: map_joystick(self.accumulator.axes()),
            buttons: *self.accumulator.buttons(),
        };
        if let Err(e) = self.sink.publish_joy(&report) {
            warn!("Failed to publish joystick report: {}", e);
        }

        if self.mode.command_enabled() {
            let command = map_twist(self.accumulator.axes(), &self.scales);
            if let Err(e) = self.sink.publish_twist(&command) {
                warn!("Failed to publish velocity command: {}", e);
            }
        }
    }

    /// Drives the cycle at the fixed poll rate until shutdown fires.
    ///
    /// The token is checked only at the top of each cycle; there is no
    /// mid-cycle cancellation.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Starting publish loop");
        let mut ticker =
            tokio::time::interval(Duration::from_micros(1_000_000 / POLL_RATE_HZ));

        let mut cycles: u64 = 0;
        let mut last_stats_time = Local::now();
        let stats_interval = chrono::Duration::seconds(30);

        loop {
            if shutdown.is_cancelled() {
                info!("Shutdown requested, stopping publish loop");
                break;
            }

            ticker.tick().await;
            self.run_cycle();
            cycles += 1;

            let now = Local::now();
            if now - last_stats_time > stats_interval {
                debug!(
                    "Publish loop stats: {} cycles in the last {} seconds",
                    cycles,
                    stats_interval.num_seconds()
                );
                cycles = 0;
                last_stats_time = now;
            }
        }
    }
}
