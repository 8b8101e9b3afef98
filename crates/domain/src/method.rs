//! Remotely invokable methods.
//!
//! A [`MethodList`] maps method names to a description, a parameter schema
//! and a handler. Invocation binds the caller's arguments against the schema
//! first; the handler only ever sees a fully validated [`ParameterList`].

use serde::Serialize;

use crate::error::{NotFoundError, RegistrationError, ThingError};
use crate::parameter::{Arguments, ParameterDescriptor, ParameterList};
use crate::plan::Plan;

type Handler<S, C> =
    Box<dyn Fn(&mut S, &ParameterList) -> Result<Plan<C>, ThingError> + Send + Sync>;

struct Method<S, C> {
    name: String,
    description: String,
    parameters: ParameterList,
    handler: Handler<S, C>,
}

/// Wire description of a method and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterDescriptor>,
}

/// Ordered registry of methods acting on a device state `S` and producing
/// plans of commands `C`.
pub struct MethodList<S, C> {
    methods: Vec<Method<S, C>>,
}

impl<S, C> Default for MethodList<S, C> {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
        }
    }
}

impl<S, C> std::fmt::Debug for MethodList<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.methods.iter().map(|m| &m.name))
            .finish()
    }
}

impl<S: 'static, C: 'static> MethodList<S, C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a method.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateMethod`] if the name is taken.
    pub fn add_method(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ParameterList,
        handler: impl Fn(&mut S, &ParameterList) -> Result<Plan<C>, ThingError>
        + Send
        + Sync
        + 'static,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(RegistrationError::DuplicateMethod(name));
        }
        self.methods.push(Method {
            name,
            description: description.into(),
            parameters,
            handler: Box::new(handler),
        });
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Look up `name`, bind `arguments` and run the handler against `state`.
    ///
    /// # Errors
    ///
    /// - [`NotFoundError::Method`] for an undeclared method.
    /// - Any [`crate::error::ArgumentError`] from binding; the handler is not
    ///   called and `state` is untouched.
    /// - Whatever the handler itself returns.
    pub fn invoke(
        &self,
        state: &mut S,
        name: &str,
        arguments: Arguments,
    ) -> Result<Plan<C>, ThingError> {
        let method = self
            .find(name)
            .ok_or_else(|| NotFoundError::Method(name.to_string()))?;
        let bound = method.parameters.bind(arguments)?;
        (method.handler)(state, &bound)
    }

    /// Declared method names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.methods.iter().map(|m| m.name.as_str())
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<MethodDescriptor> {
        self.methods
            .iter()
            .map(|m| MethodDescriptor {
                name: m.name.clone(),
                description: m.description.clone(),
                parameters: m.parameters.iter().map(|p| p.descriptor()).collect(),
            })
            .collect()
    }

    fn find(&self, name: &str) -> Option<&Method<S, C>> {
        self.methods.iter().find(|m| m.name == name)
    }
}
