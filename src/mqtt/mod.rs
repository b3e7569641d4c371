//! Output records and the transport that carries them.
//!
//! The publish loop writes through the [`CommandSink`] trait and never sees
//! broker details; [`MqttSink`] is the production implementation, tests use
//! a recording stand-in.

pub mod messages;
pub mod sink;

pub use messages::{JoyReport, TwistCommand, Vector3};
pub use sink::MqttSink;

/// Transport errors. Everything after startup is recoverable from the
/// loop's point of view: the cycle logs the failure and carries on.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to connect to broker: {0}")]
    ConnectionError(String),

    #[error("Failed to encode message: {0}")]
    EncodingError(String),

    #[error("Failed to publish message: {0}")]
    PublishError(String),
}

/// Sink for the two output channels, one typed record per publish call.
pub trait CommandSink {
    /// Publishes the joystick passthrough report.
    fn publish_joy(&mut self, report: &JoyReport) -> Result<(), TransportError>;

    /// Publishes one velocity command.
    fn publish_twist(&mut self, command: &TwistCommand) -> Result<(), TransportError>;
}
