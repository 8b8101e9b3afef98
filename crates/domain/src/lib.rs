//! # thingkit-domain
//!
//! Capability model for the thingkit device framework.
//!
//! ## Responsibilities
//! - Typed scalar [`value::Value`]s and their type tags
//! - Parameter schemas and argument binding ([`parameter::ParameterList`])
//! - Read-only property registries ([`property::PropertyList`])
//! - Method registries producing hardware [`plan::Plan`]s ([`method::MethodList`])
//! - The object-safe [`thing::Thing`] interface and its declarative implementation
//! - State snapshots, invocation identifiers and the error taxonomy
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! Hardware access happens in the `app` crate, which executes the plans
//! produced here against an actuator port.

pub mod error;
pub mod id;
pub mod method;
pub mod parameter;
pub mod plan;
pub mod property;
pub mod snapshot;
pub mod thing;
pub mod value;
