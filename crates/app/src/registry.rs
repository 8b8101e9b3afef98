//! Device type registry.
//!
//! The startup routine registers one factory per device type it supports,
//! then asks the [`ThingManager`](crate::services::thing_manager::ThingManager)
//! to instantiate the enabled ones. The registry is an ordinary value owned by
//! that routine; nothing about it is global.

use std::collections::BTreeMap;

use thingkit_domain::error::{NotFoundError, RegistrationError, ThingError};
use thingkit_domain::thing::Thing;

/// A boxed thing emitting commands `C`.
pub type BoxedThing<C> = Box<dyn Thing<Command = C>>;

type Factory<C> = Box<dyn Fn() -> Result<BoxedThing<C>, ThingError> + Send + Sync>;

/// Maps device type names to factories.
pub struct DeviceRegistry<C> {
    factories: BTreeMap<String, Factory<C>>,
}

impl<C> Default for DeviceRegistry<C> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for DeviceRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl<C: 'static> DeviceRegistry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateDeviceType`] if the name is taken.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        factory: impl Fn() -> Result<BoxedThing<C>, ThingError> + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        let type_name = type_name.into();
        if self.factories.contains_key(&type_name) {
            return Err(RegistrationError::DuplicateDeviceType(type_name));
        }
        tracing::info!(device_type = %type_name, "registered device type");
        self.factories.insert(type_name, Box::new(factory));
        Ok(())
    }

    /// Build a fresh thing of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::DeviceType`] for an unregistered type, or the
    /// factory's own error.
    pub fn create(&self, type_name: &str) -> Result<BoxedThing<C>, ThingError> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| NotFoundError::DeviceType(type_name.to_string()))?;
        factory()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
