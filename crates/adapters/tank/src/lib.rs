//! # thingkit-adapter-tank
//!
//! A tracked tank exposed as a thing.
//!
//! ## Capabilities
//!
//! | Method | Effect on the chassis |
//! |--------|-----------------------|
//! | `TurnOn` / `TurnOff` | light pattern 2 / 8 |
//! | `GoForward` / `GoBack` | move for 500 ms, then stop |
//! | `GoLeft` / `GoRight` | turn for 600 ms, then stop |
//! | `GoDance` | start dance routine 1 |
//! | `LightShow` | light pattern 7 for 10 s, then 8 |
//! | `SetSpeed` / `SetBrightness` | advisory speed / brightness (1..=100) |
//!
//! Properties: `power`, `speed`, `direction`, `brightness`.
//!
//! ## Dependency rule
//!
//! Depends on `thingkit-app` (port traits, registry) and `thingkit-domain` only.

pub mod chassis;
pub mod command;
pub mod tank;

pub use chassis::{ChassisError, SimulatedChassis};
pub use command::{ChassisCommand, MotionVector};
pub use tank::{TYPE_NAME, Tank, TankState, register, tank};
