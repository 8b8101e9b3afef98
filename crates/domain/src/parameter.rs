//! Method parameter schemas and argument binding.
//!
//! A [`ParameterList`] is declared once, when a thing registers a method, and
//! describes the call contract. At invocation time the caller's
//! [`Arguments`] are bound against it, producing a copy whose parameters carry
//! the supplied values. Binding either succeeds completely or fails without
//! side effects.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{ArgumentError, RegistrationError, ThingError};
use crate::value::{Value, ValueType};

/// A named, typed formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    description: String,
    value_type: ValueType,
    required: bool,
    range: Option<RangeInclusive<f64>>,
    integral: bool,
    value: Option<Value>,
}

impl Parameter {
    /// Declare a parameter.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        value_type: ValueType,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value_type,
            required,
            range: None,
            integral: false,
            value: None,
        }
    }

    /// Restrict a number parameter to an inclusive range.
    #[must_use]
    pub fn with_range(mut self, range: RangeInclusive<f64>) -> Self {
        self.range = Some(range);
        self
    }

    /// Accept only whole numbers for a number parameter.
    #[must_use]
    pub fn integral(mut self) -> Self {
        self.integral = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn range(&self) -> Option<&RangeInclusive<f64>> {
        self.range.as_ref()
    }

    /// The bound value, if this parameter belongs to a bound list and was supplied.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Serializable description of this parameter.
    #[must_use]
    pub fn descriptor(&self) -> ParameterDescriptor {
        ParameterDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            value_type: self.value_type,
            required: self.required,
            integer: self.integral,
            min: self.range.as_ref().map(|r| *r.start()),
            max: self.range.as_ref().map(|r| *r.end()),
        }
    }

    fn check(&self, value: &Value) -> Result<(), ArgumentError> {
        if value.value_type() != self.value_type {
            return Err(ArgumentError::Type {
                name: self.name.clone(),
                expected: self.value_type,
                actual: value.value_type(),
            });
        }
        if let Value::Number(n) = value
            && self.integral
            && n.fract() != 0.0
        {
            return Err(ArgumentError::Fraction {
                name: self.name.clone(),
                value: *n,
            });
        }
        if let (Some(range), Value::Number(n)) = (&self.range, value)
            && !range.contains(n)
        {
            return Err(ArgumentError::Range {
                name: self.name.clone(),
                value: *n,
                min: *range.start(),
                max: *range.end(),
            });
        }
        Ok(())
    }
}

/// Wire description of a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub integer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Ordered parameter schema, optionally bound to argument values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    parameters: Vec<Parameter>,
}

impl ParameterList {
    /// An empty schema, for methods without parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from parameter declarations.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateParameter`] if two parameters share a name.
    pub fn from_parameters(
        parameters: impl IntoIterator<Item = Parameter>,
    ) -> Result<Self, RegistrationError> {
        let mut list = Self::new();
        for parameter in parameters {
            list.add(parameter)?;
        }
        Ok(list)
    }

    /// Append a parameter declaration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateParameter`] if the name is taken.
    pub fn add(&mut self, parameter: Parameter) -> Result<(), RegistrationError> {
        if self.find(parameter.name()).is_some() {
            return Err(RegistrationError::DuplicateParameter(
                parameter.name().to_string(),
            ));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> + '_ {
        self.parameters.iter()
    }

    /// Look up a parameter declaration by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(name).and_then(Parameter::value)
    }

    /// The value bound to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Missing`] if nothing is bound (for example an
    /// optional parameter the caller omitted).
    pub fn value(&self, name: &str) -> Result<&Value, ThingError> {
        self.get(name).ok_or_else(|| {
            ArgumentError::Missing {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Fails if nothing is bound to `name` or the value is not a boolean.
    pub fn boolean(&self, name: &str) -> Result<bool, ThingError> {
        Ok(self.value(name)?.as_bool()?)
    }

    /// # Errors
    ///
    /// Fails if nothing is bound to `name` or the value is not a number.
    pub fn number(&self, name: &str) -> Result<f64, ThingError> {
        Ok(self.value(name)?.as_number()?)
    }

    /// # Errors
    ///
    /// Fails if nothing is bound to `name` or the value is not a string.
    pub fn string(&self, name: &str) -> Result<&str, ThingError> {
        Ok(self.value(name)?.as_str()?)
    }

    /// Narrow a bound number to `u8`, saturating at the type's bounds.
    ///
    /// # Errors
    ///
    /// Fails if nothing is bound to `name` or the value is not a number.
    pub fn byte(&self, name: &str) -> Result<u8, ThingError> {
        let n = self.value(name)?.as_integer()?;
        Ok(u8::try_from(n.clamp(0, i64::from(u8::MAX))).unwrap_or(u8::MAX))
    }

    /// Validate `arguments` against this schema and return a bound copy.
    ///
    /// Checks run in order: unknown names, missing required parameters,
    /// value types (whole numbers included), numeric ranges. The first failure is returned and the
    /// schema itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns the first [`ArgumentError`] encountered.
    pub fn bind(&self, arguments: Arguments) -> Result<Self, ArgumentError> {
        let supplied = self.resolve(arguments)?;

        if let Some(missing) = self
            .parameters
            .iter()
            .zip(&supplied)
            .find(|(p, v)| p.required && v.is_none())
        {
            return Err(ArgumentError::Missing {
                name: missing.0.name.clone(),
            });
        }

        for (parameter, value) in self.parameters.iter().zip(&supplied) {
            if let Some(value) = value {
                parameter.check(value)?;
            }
        }

        let parameters = self
            .parameters
            .iter()
            .zip(supplied)
            .map(|(parameter, value)| Parameter {
                value,
                ..parameter.clone()
            })
            .collect();
        Ok(Self { parameters })
    }

    /// Place each supplied argument at its schema position.
    fn resolve(&self, arguments: Arguments) -> Result<Vec<Option<Value>>, ArgumentError> {
        let mut supplied: Vec<Option<Value>> = vec![None; self.parameters.len()];
        match arguments {
            Arguments::Named(named) => {
                for (name, value) in named {
                    let index = self
                        .parameters
                        .iter()
                        .position(|p| p.name == name)
                        .ok_or(ArgumentError::Unknown { name })?;
                    supplied[index] = Some(value);
                }
            }
            Arguments::Positional(values) => {
                if values.len() > self.parameters.len() {
                    return Err(ArgumentError::Unknown {
                        name: format!("#{}", self.parameters.len()),
                    });
                }
                for (slot, value) in supplied.iter_mut().zip(values) {
                    *slot = Some(value);
                }
            }
        }
        Ok(supplied)
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Arguments supplied by a caller, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// Name/value pairs, in the order the caller gave them.
    Named(Vec<(String, Value)>),
    /// Values matched to parameters by schema order.
    Positional(Vec<Value>),
}

impl Default for Arguments {
    fn default() -> Self {
        Self::Named(Vec::new())
    }
}

impl Arguments {
    /// No arguments.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a named argument. Has no effect on positional arguments.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Named(named) = &mut self {
            named.push((name.into(), value.into()));
        }
        self
    }

    /// Convert a JSON object (`{"speed": 50}`) into named arguments.
    ///
    /// `null` is treated as "no arguments".
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unsupported`] if the payload is not an object
    /// or one of its members is not a scalar.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ArgumentError> {
        match json {
            serde_json::Value::Null => Ok(Self::none()),
            serde_json::Value::Object(map) => Self::from_json_map(map),
            serde_json::Value::Array(_) => Err(unsupported_payload("array")),
            serde_json::Value::Bool(_) => Err(unsupported_payload("boolean")),
            serde_json::Value::Number(_) => Err(unsupported_payload("number")),
            serde_json::Value::String(_) => Err(unsupported_payload("string")),
        }
    }

    /// Convert the members of a JSON object into named arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unsupported`] for non-scalar members.
    pub fn from_json_map(
        map: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, ArgumentError> {
        map.into_iter()
            .map(|(name, json)| Value::from_json(&name, json).map(|value| (name, value)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Named)
    }
}

fn unsupported_payload(kind: &'static str) -> ArgumentError {
    ArgumentError::Unsupported {
        name: "parameters".to_string(),
        kind,
    }
}
