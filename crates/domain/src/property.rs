//! Read-only properties exposed by a thing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{NotFoundError, RegistrationError};
use crate::value::{Value, ValueType};

type Accessor<S> = Box<dyn Fn(&S) -> Value + Send + Sync>;

struct Property<S> {
    name: String,
    description: String,
    value_type: ValueType,
    accessor: Accessor<S>,
}

/// Wire description of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// Ordered registry of properties computed from a device state `S`.
///
/// Accessors only ever receive `&S`, so reading a property cannot mutate the
/// device.
pub struct PropertyList<S> {
    properties: Vec<Property<S>>,
}

impl<S> Default for PropertyList<S> {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
        }
    }
}

impl<S> std::fmt::Debug for PropertyList<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.properties.iter().map(|p| &p.name))
            .finish()
    }
}

impl<S: 'static> PropertyList<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a boolean property.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateProperty`] if the name is taken.
    pub fn add_boolean_property(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        accessor: impl Fn(&S) -> bool + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        self.add(
            name.into(),
            description.into(),
            ValueType::Boolean,
            Box::new(move |state| Value::Boolean(accessor(state))),
        )
    }

    /// Declare a number property.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateProperty`] if the name is taken.
    pub fn add_number_property(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        accessor: impl Fn(&S) -> f64 + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        self.add(
            name.into(),
            description.into(),
            ValueType::Number,
            Box::new(move |state| Value::Number(accessor(state))),
        )
    }

    /// Declare a string property.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateProperty`] if the name is taken.
    pub fn add_string_property(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        accessor: impl Fn(&S) -> String + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        self.add(
            name.into(),
            description.into(),
            ValueType::String,
            Box::new(move |state| Value::String(accessor(state))),
        )
    }

    fn add(
        &mut self,
        name: String,
        description: String,
        value_type: ValueType,
        accessor: Accessor<S>,
    ) -> Result<(), RegistrationError> {
        if self.contains(&name) {
            return Err(RegistrationError::DuplicateProperty(name));
        }
        self.properties.push(Property {
            name,
            description,
            value_type,
            accessor,
        });
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Read a property by evaluating its accessor against `state`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Property`] for an undeclared name.
    pub fn get(&self, state: &S, name: &str) -> Result<Value, NotFoundError> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| (p.accessor)(state))
            .ok_or_else(|| NotFoundError::Property(name.to_string()))
    }

    /// Declared property names, in declaration order.
    ///
    /// The iterator is lazy; call again to restart the enumeration.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Descriptions of every declared property, in declaration order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<PropertyDescriptor> {
        self.properties
            .iter()
            .map(|p| PropertyDescriptor {
                name: p.name.clone(),
                description: p.description.clone(),
                value_type: p.value_type,
            })
            .collect()
    }

    /// Evaluate every accessor against `state`.
    #[must_use]
    pub fn snapshot(&self, state: &S) -> BTreeMap<String, Value> {
        self.properties
            .iter()
            .map(|p| (p.name.clone(), (p.accessor)(state)))
            .collect()
    }
}
