//! # thingkitd: thingkit daemon
//!
//! Composition root that wires the device adapters to the hub.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Build the device registry and register every supported device type
//! - Instantiate the enabled devices against their actuator
//! - Serve hub requests as JSON lines on stdin/stdout until stdin closes
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no capability logic belongs here.

mod config;
mod console;

use std::io::IsTerminal;
use std::sync::Arc;

use thingkit_adapter_tank::SimulatedChassis;
use thingkit_app::hub::Hub;
use thingkit_app::registry::DeviceRegistry;
use thingkit_app::services::thing_manager::ThingManager;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Logs go to stderr; stdout carries responses only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    // Device types
    let mut registry = DeviceRegistry::new();
    thingkit_adapter_tank::register(&mut registry)?;

    // Things
    let manager = Arc::new(ThingManager::new(SimulatedChassis::new()));
    for type_name in &config.devices.enabled {
        let name = manager
            .instantiate(&registry, type_name)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    device_type = %type_name,
                    error = %err,
                    code = err.code(),
                    "failed to enable device"
                );
            })?;
        tracing::info!(device_type = %type_name, thing = %name, "device enabled");
    }

    tracing::info!(
        things = manager.thing_names().len(),
        concurrent = config.hub.concurrent,
        "hub ready on stdin"
    );
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    console::run(Hub::new(manager), input, tokio::io::stdout(), config.hub.concurrent).await?;

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
