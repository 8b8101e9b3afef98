//! The device-facing capability interface.
//!
//! A [`Thing`] is what the hub sees: a named bundle of read-only properties
//! and invokable methods. [`DeclaredThing`] is the generic implementation:
//! a concrete device supplies its state struct, declares properties and
//! methods against it once, and hands the result to the application layer as
//! a `Box<dyn Thing<Command = C>>`.

use serde::Serialize;

use crate::error::{RegistrationError, ThingError};
use crate::method::{MethodDescriptor, MethodList};
use crate::parameter::{Arguments, ParameterList};
use crate::plan::Plan;
use crate::property::{PropertyDescriptor, PropertyList};
use crate::snapshot::StateSnapshot;
use crate::value::Value;

/// Serializable description of a thing's capabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThingDescriptor {
    pub name: String,
    pub description: String,
    pub properties: Vec<PropertyDescriptor>,
    pub methods: Vec<MethodDescriptor>,
}

/// A device as exposed to the hub.
///
/// Object-safe: the application layer stores things as trait objects and
/// only needs to know the command vocabulary of the actuator they drive.
pub trait Thing: Send {
    /// Commands this thing emits in its plans.
    type Command;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn descriptor(&self) -> ThingDescriptor;

    /// # Errors
    ///
    /// Returns [`crate::error::NotFoundError::Property`] for an undeclared property.
    fn read_property(&self, name: &str) -> Result<Value, ThingError>;

    /// Read every property at once.
    fn snapshot(&self) -> StateSnapshot;

    /// Validate arguments, run the handler and return the plan to execute.
    ///
    /// # Errors
    ///
    /// Lookup, binding or handler failures. On failure no plan exists, so no
    /// hardware command can be issued.
    fn invoke_method(
        &mut self,
        name: &str,
        arguments: Arguments,
    ) -> Result<Plan<Self::Command>, ThingError>;

    /// Hardware initialization run once, before the thing accepts calls.
    fn startup(&self) -> Plan<Self::Command>;
}

/// A thing whose capabilities are declared against a state struct `S`.
pub struct DeclaredThing<S, C> {
    name: String,
    description: String,
    state: S,
    properties: PropertyList<S>,
    methods: MethodList<S, C>,
    startup: Plan<C>,
}

impl<S, C> std::fmt::Debug for DeclaredThing<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclaredThing")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

impl<S: 'static, C: 'static> DeclaredThing<S, C> {
    /// A thing with no capabilities yet.
    pub fn new(name: impl Into<String>, description: impl Into<String>, state: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            state,
            properties: PropertyList::new(),
            methods: MethodList::new(),
            startup: Plan::none(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Declare a boolean property. See [`PropertyList::add_boolean_property`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateProperty`] if the name is taken.
    pub fn boolean_property(
        mut self,
        name: &str,
        description: &str,
        accessor: impl Fn(&S) -> bool + Send + Sync + 'static,
    ) -> Result<Self, RegistrationError> {
        self.properties
            .add_boolean_property(name, description, accessor)?;
        Ok(self)
    }

    /// Declare a number property.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateProperty`] if the name is taken.
    pub fn number_property(
        mut self,
        name: &str,
        description: &str,
        accessor: impl Fn(&S) -> f64 + Send + Sync + 'static,
    ) -> Result<Self, RegistrationError> {
        self.properties
            .add_number_property(name, description, accessor)?;
        Ok(self)
    }

    /// Declare a string property.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateProperty`] if the name is taken.
    pub fn string_property(
        mut self,
        name: &str,
        description: &str,
        accessor: impl Fn(&S) -> String + Send + Sync + 'static,
    ) -> Result<Self, RegistrationError> {
        self.properties
            .add_string_property(name, description, accessor)?;
        Ok(self)
    }

    /// Declare a method.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateMethod`] if the name is taken.
    pub fn method(
        mut self,
        name: &str,
        description: &str,
        parameters: ParameterList,
        handler: impl Fn(&mut S, &ParameterList) -> Result<Plan<C>, ThingError>
        + Send
        + Sync
        + 'static,
    ) -> Result<Self, RegistrationError> {
        self.methods
            .add_method(name, description, parameters, handler)?;
        Ok(self)
    }

    /// Set the plan run when the thing is brought online.
    #[must_use]
    pub fn on_startup(mut self, plan: Plan<C>) -> Self {
        self.startup = plan;
        self
    }
}

impl<S, C> Thing for DeclaredThing<S, C>
where
    S: Send + 'static,
    C: Clone + Send + 'static,
{
    type Command = C;

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn descriptor(&self) -> ThingDescriptor {
        ThingDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            properties: self.properties.descriptors(),
            methods: self.methods.descriptors(),
        }
    }

    fn read_property(&self, name: &str) -> Result<Value, ThingError> {
        Ok(self.properties.get(&self.state, name)?)
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(self.name.clone(), self.properties.snapshot(&self.state))
    }

    fn invoke_method(&mut self, name: &str, arguments: Arguments) -> Result<Plan<C>, ThingError> {
        self.methods.invoke(&mut self.state, name, arguments)
    }

    fn startup(&self) -> Plan<C> {
        self.startup.clone()
    }
}
