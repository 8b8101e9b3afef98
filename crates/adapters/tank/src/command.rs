//! Chassis command vocabulary.
//!
//! These are the only operations the tank ever asks of its chassis
//! controller. Each command has a compact line encoding ([`fmt::Display`])
//! matching what the controller firmware accepts, e.g. `x0.0y1.0` for a
//! forward motion vector.

use std::fmt;

/// Light pattern for "lit".
pub const LIGHT_ON: u8 = 2;
/// Light pattern for the light show.
pub const LIGHT_SHOW: u8 = 7;
/// Light pattern for "off".
pub const LIGHT_OFF: u8 = 8;
/// Dance routine started by `GoDance`.
pub const DANCE_ROUTINE: u8 = 1;

/// A planar motion request. Each axis is in `-1.0..=1.0`; `(0, 0)` stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionVector {
    pub x: f32,
    pub y: f32,
}

impl MotionVector {
    pub const STOP: Self = Self::new(0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 1.0);
    pub const BACK: Self = Self::new(0.0, -1.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_stop(&self) -> bool {
        *self == Self::STOP
    }
}

impl fmt::Display for MotionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{:.1}y{:.1}", self.x, self.y)
    }
}

/// One instruction for the chassis controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChassisCommand {
    /// Initialize the chassis subsystem.
    Start,
    Motion(MotionVector),
    RgbLight(u8),
    DanceMode(u8),
    /// Advisory drive speed, 1..=100.
    Speed(u8),
    /// Advisory light brightness, 1..=100.
    Brightness(u8),
}

impl fmt::Display for ChassisCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Motion(vector) => write!(f, "{vector}"),
            Self::RgbLight(code) => write!(f, "light:{code}"),
            Self::DanceMode(mode) => write!(f, "dance:{mode}"),
            Self::Speed(speed) => write!(f, "speed:{speed}"),
            Self::Brightness(level) => write!(f, "brightness:{level}"),
        }
    }
}
