//! Application services: use-case implementations.
//!
//! Services receive their port implementations through generic parameters,
//! keeping this layer decoupled from concrete hardware adapters.

pub mod thing_manager;
