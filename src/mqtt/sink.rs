//! rumqttc-backed implementation of the command sink.

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{CommandSink, JoyReport, TransportError, TwistCommand};
use crate::config::{MqttServerConfig, TopicConfig};

/// MQTT client publishing the two output channels.
///
/// Publishing uses `try_publish` so a slow or absent broker can never stall
/// the 1 kHz cycle; a full request queue surfaces as a recoverable
/// [`TransportError`]. The rumqttc event loop runs in its own task and
/// keeps reconnecting in the background.
pub struct MqttSink {
    client: AsyncClient,
    topics: TopicConfig,
    _driver: JoinHandle<()>,
}

impl MqttSink {
    /// Sets up the client and spawns the event-loop driver task.
    pub fn connect(
        server: &MqttServerConfig,
        topics: TopicConfig,
    ) -> Result<Self, TransportError> {
        let (host, port) = split_url(&server.url).ok_or_else(|| {
            TransportError::ConnectionError(format!("invalid broker url '{}'", server.url))
        })?;
        info!("Connecting to MQTT broker {}:{}", host, port);

        let mut options = MqttOptions::new("spacenav-teleop", host, port);
        options.set_keep_alive(Duration::from_secs(5));
        if !server.user.is_empty() {
            options.set_credentials(server.user.clone(), server.pw.clone());
        }

        let (client, event_loop) = AsyncClient::new(options, 100);
        let driver = tokio::spawn(drive_event_loop(event_loop));

        Ok(Self {
            client,
            topics,
            _driver: driver,
        })
    }

    fn publish<T: Serialize>(&self, topic: &str, message: &T) -> Result<(), TransportError> {
        let payload = serde_json::to_vec(message)
            .map_err(|e| TransportError::EncodingError(e.to_string()))?;
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(|e| TransportError::PublishError(e.to_string()))
    }
}

impl CommandSink for MqttSink {
    fn publish_joy(&mut self, report: &JoyReport) -> Result<(), TransportError> {
        self.publish(&self.topics.joy, report)
    }

    fn publish_twist(&mut self, command: &TwistCommand) -> Result<(), TransportError> {
        self.publish(&self.topics.twist, command)
    }
}

/// Keeps the connection alive; rumqttc reconnects on the next poll after an
/// error, the sleep just avoids hammering an unreachable broker.
async fn drive_event_loop(mut event_loop: EventLoop) {
    loop {
        match event_loop.poll().await {
            Ok(event) => debug!("MQTT event: {:?}", event),
            Err(e) => {
                warn!("MQTT connection error: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

/// Splits `host` or `host:port` into its parts; 1883 when no port given.
fn split_url(url: &str) -> Option<(String, u16)> {
    let mut parts = url.split(':');
    let host = match parts.next() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return None,
    };
    let port = match parts.next() {
        Some(port) => port.parse().ok()?,
        None => 1883,
    };
    Some((host, port))
}
