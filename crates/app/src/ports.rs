//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundary between the application core and hardware. They
//! live here so that both the services and the adapter crates can depend on
//! them without a cycle.

pub mod actuator;

pub use actuator::Actuator;
