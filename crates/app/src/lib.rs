//! # thingkit-app
//!
//! Application layer: ports, plan execution and hub-facing services.
//!
//! ## Responsibilities
//! - Define the [`ports::Actuator`] port that hardware adapters implement
//! - Execute [`Plan`](thingkit_domain::plan::Plan)s produced by method handlers
//! - Keep the [`registry::DeviceRegistry`] of constructible device types
//! - Own live things in the [`services::thing_manager::ThingManager`], which
//!   serializes invocations per thing and produces state reports
//! - Expose the JSON request/response [`hub::Hub`]
//!
//! ## Dependency rule
//! Depends on `thingkit-domain` only (plus `tokio` for locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod executor;
pub mod hub;
pub mod ports;
pub mod registry;
pub mod services;

#[cfg(test)]
mod fakes;
