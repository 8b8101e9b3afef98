//! Typed scalar values used for property readings and method arguments.

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, TypeMismatchError};

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Number,
    String,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
        }
    }
}

/// A single typed scalar.
///
/// Serializes as the plain JSON scalar. Reading it as a different type fails
/// with [`TypeMismatchError`] instead of coercing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// The type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::Number(_) => ValueType::Number,
            Self::String(_) => ValueType::String,
        }
    }

    /// # Errors
    ///
    /// Returns [`TypeMismatchError`] unless this is a boolean.
    pub fn as_bool(&self) -> Result<bool, TypeMismatchError> {
        match self {
            Self::Boolean(b) => Ok(*b),
            other => Err(other.mismatch(ValueType::Boolean)),
        }
    }

    /// # Errors
    ///
    /// Returns [`TypeMismatchError`] unless this is a number.
    pub fn as_number(&self) -> Result<f64, TypeMismatchError> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(other.mismatch(ValueType::Number)),
        }
    }

    /// Narrow a number to an integer, truncating toward zero.
    ///
    /// Out-of-range values saturate at the bounds of `i64`; `NaN` becomes 0.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatchError`] unless this is a number.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Result<i64, TypeMismatchError> {
        self.as_number().map(|n| n as i64)
    }

    /// # Errors
    ///
    /// Returns [`TypeMismatchError`] unless this is a string.
    pub fn as_str(&self) -> Result<&str, TypeMismatchError> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(other.mismatch(ValueType::String)),
        }
    }

    /// Convert a JSON scalar into a value.
    ///
    /// `name` is only used to label the error.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unsupported`] for `null`, arrays and objects.
    pub fn from_json(name: &str, json: serde_json::Value) -> Result<Self, ArgumentError> {
        let kind = match json {
            serde_json::Value::Bool(b) => return Ok(Self::Boolean(b)),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(n) => return Ok(Self::Number(n)),
                None => "number",
            },
            serde_json::Value::String(s) => return Ok(Self::String(s)),
            serde_json::Value::Null => "null",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        Err(ArgumentError::Unsupported {
            name: name.to_string(),
            kind,
        })
    }

    fn mismatch(&self, expected: ValueType) -> TypeMismatchError {
        TypeMismatchError {
            expected,
            actual: self.value_type(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}
