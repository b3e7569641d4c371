pub mod config;
pub mod device;
pub mod mapping;
pub mod mqtt;
pub mod state;
pub mod teleop;

use crate::config::TeleopConfig;
use crate::device::SpaceMouse;
use crate::mqtt::MqttSink;
use crate::teleop::TeleopNode;
use color_eyre::eyre::{eyre, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = TeleopConfig::load()?;

    info!("Setting up MQTT transport");
    let sink = MqttSink::connect(&config.mqtt, config.topics.clone())
        .map_err(|e| eyre!("Failed to set up MQTT transport: {}", e))?;

    info!("Opening space navigator device");
    let device = SpaceMouse::open(&config.device).map_err(|e| {
        // Fatal: without the device there is nothing to publish. No retry.
        error!("Could not open the space navigator device: {}", e);
        eyre!("Failed to open device: {}", e)
    })?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received ctrl-c, shutting down");
            signal_token.cancel();
        }
    });

    let node = TeleopNode::create(Box::new(device), Box::new(sink), &config);
    node.initialize().run(shutdown).await;

    info!("Teleop node stopped");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
