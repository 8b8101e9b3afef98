//! Error types shared across the workspace.
//!
//! [`ThingError`] is the single error surfaced to the hub. Each layer of the
//! capability model has its own typed error that converts into it via
//! `#[from]`; [`ThingError::code`] yields a stable snake-case code for wire
//! responses.

use crate::value::ValueType;

/// Top-level error for every thing, registry and invocation operation.
#[derive(Debug, thiserror::Error)]
pub enum ThingError {
    /// A name was declared twice (property, method, parameter, device type, thing).
    #[error("registration error")]
    Registration(#[from] RegistrationError),

    /// A lookup by name failed.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The supplied arguments do not satisfy the method's schema.
    #[error("invalid arguments")]
    Argument(#[from] ArgumentError),

    /// A value was read as a type it does not hold.
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),

    /// The hardware collaborator rejected or failed a command.
    #[error("hardware fault")]
    Hardware(#[from] HardwareFault),

    /// A command payload could not be decoded.
    #[error("malformed command")]
    MalformedCommand(#[source] serde_json::Error),
}

impl ThingError {
    /// Stable, machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Registration(err) => err.code(),
            Self::NotFound(err) => err.code(),
            Self::Argument(err) => err.code(),
            Self::TypeMismatch(_) => "type_mismatch",
            Self::Hardware(_) => "hardware_fault",
            Self::MalformedCommand(_) => "malformed_command",
        }
    }
}

/// Duplicate declarations, detected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("property {0:?} is already declared")]
    DuplicateProperty(String),
    #[error("method {0:?} is already declared")]
    DuplicateMethod(String),
    #[error("parameter {0:?} is already declared")]
    DuplicateParameter(String),
    #[error("device type {0:?} is already registered")]
    DuplicateDeviceType(String),
    #[error("thing {0:?} is already managed")]
    DuplicateThing(String),
}

impl RegistrationError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateProperty(_) => "duplicate_property",
            Self::DuplicateMethod(_) => "duplicate_method",
            Self::DuplicateParameter(_) => "duplicate_parameter",
            Self::DuplicateDeviceType(_) => "duplicate_device_type",
            Self::DuplicateThing(_) => "duplicate_thing",
        }
    }
}

/// Lookups that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("property not found: {0}")]
    Property(String),
    #[error("method not found: {0}")]
    Method(String),
    #[error("device type not found: {0}")]
    DeviceType(String),
    #[error("thing not found: {0}")]
    Thing(String),
}

impl NotFoundError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Property(_) => "property_not_found",
            Self::Method(_) => "method_not_found",
            Self::DeviceType(_) => "device_type_not_found",
            Self::Thing(_) => "thing_not_found",
        }
    }
}

/// Argument binding failures. None of these ever reach a method handler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgumentError {
    /// The argument name is not part of the schema.
    #[error("unknown argument {name:?}")]
    Unknown { name: String },

    /// A required parameter received no value.
    #[error("missing required argument {name:?}")]
    Missing { name: String },

    /// The value's type disagrees with the declared parameter type.
    #[error("argument {name:?} must be a {expected}, got {actual}")]
    Type {
        name: String,
        expected: ValueType,
        actual: ValueType,
    },

    /// A number falls outside the parameter's declared range.
    #[error("argument {name:?} must be within [{min}, {max}], got {value}")]
    Range {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter declared integral received a fractional number.
    #[error("argument {name:?} must be an integer, got {value}")]
    Fraction { name: String, value: f64 },

    /// The raw argument is not a scalar the capability model understands.
    #[error("argument {name:?} has unsupported kind {kind}")]
    Unsupported { name: String, kind: &'static str },
}

impl ArgumentError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unknown { .. } => "unknown_argument",
            Self::Missing { .. } => "missing_argument",
            Self::Type { .. } | Self::Fraction { .. } => "argument_type",
            Self::Range { .. } => "argument_range",
            Self::Unsupported { .. } => "unsupported_argument",
        }
    }
}

/// A value was accessed as the wrong type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected a {expected} value, found {actual}")]
pub struct TypeMismatchError {
    pub expected: ValueType,
    pub actual: ValueType,
}

/// Opaque failure reported by the hardware collaborator.
#[derive(Debug, thiserror::Error)]
#[error("{context}")]
pub struct HardwareFault {
    context: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HardwareFault {
    /// Wrap an adapter error.
    pub fn new(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    /// A fault without an underlying cause.
    pub fn message(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: None,
        }
    }
}
