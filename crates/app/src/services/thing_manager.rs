//! Thing manager: owns the live things and runs their invocations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thingkit_domain::error::{NotFoundError, RegistrationError, ThingError};
use thingkit_domain::id::InvocationId;
use thingkit_domain::parameter::Arguments;
use thingkit_domain::snapshot::StateSnapshot;
use thingkit_domain::thing::ThingDescriptor;
use thingkit_domain::value::Value;

use crate::executor::execute_plan;
use crate::ports::Actuator;
use crate::registry::{BoxedThing, DeviceRegistry};

/// Result of a completed method invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationOutcome {
    pub id: InvocationId,
    pub thing: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Command shape accepted by [`ThingManager::invoke_command`].
#[derive(Debug, Deserialize)]
struct Command {
    name: String,
    method: String,
    #[serde(default)]
    parameters: serde_json::Value,
}

struct Slot<C> {
    name: String,
    /// Held for a whole invocation, plan execution included.
    turn: tokio::sync::Mutex<()>,
    /// Held only while calling into the thing itself.
    thing: Mutex<BoxedThing<C>>,
}

impl<C> Slot<C> {
    fn with_thing<T>(&self, f: impl FnOnce(&mut BoxedThing<C>) -> T) -> T {
        let mut thing = self.thing.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut thing)
    }
}

/// Claim on a thing name while its startup plan runs.
struct Reservation<'a> {
    starting: &'a Mutex<HashSet<String>>,
    name: String,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.starting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.name);
    }
}

/// Owns every live thing and the actuator their plans run against.
///
/// Invocations on the same thing are serialized: a second call waits until
/// the first has executed its whole plan, holds included. Different things
/// run independently. Property reads never wait for a running plan.
pub struct ThingManager<A: Actuator> {
    actuator: A,
    slots: RwLock<Vec<Arc<Slot<A::Command>>>>,
    /// Names whose startup plan is running.
    starting: Mutex<HashSet<String>>,
    last_reported: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl<A: Actuator> fmt::Debug for ThingManager<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ThingManager")
            .field("things", &slots.iter().map(|s| &s.name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<A> ThingManager<A>
where
    A: Actuator,
    A::Command: fmt::Debug + Send + Sync + 'static,
{
    /// Create an empty manager driving `actuator`.
    pub fn new(actuator: A) -> Self {
        Self {
            actuator,
            slots: RwLock::new(Vec::new()),
            starting: Mutex::new(HashSet::new()),
            last_reported: Mutex::new(HashMap::new()),
        }
    }

    /// Bring a thing online: run its startup plan, then start managing it.
    ///
    /// The name is claimed before the startup plan runs, so a second thing
    /// with the same name is rejected without touching the actuator.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateThing`] if a thing with the same
    /// name is already managed or starting, or the [`ThingError::Hardware`]
    /// fault of a failed startup plan. In both cases the thing is dropped.
    #[tracing::instrument(skip_all, fields(thing = %thing.name()))]
    pub async fn add_thing(&self, thing: BoxedThing<A::Command>) -> Result<(), ThingError> {
        let reservation = self.reserve(thing.name())?;

        let (steps, _) = thing.startup().into_parts();
        if let Err(fault) = execute_plan(&self.actuator, steps).await {
            tracing::error!(error = %fault, "startup failed");
            return Err(fault.into());
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.push(Arc::new(Slot {
            name: reservation.name.clone(),
            turn: tokio::sync::Mutex::new(()),
            thing: Mutex::new(thing),
        }));
        drop(reservation);
        tracing::info!("thing online");
        Ok(())
    }

    /// Build a thing from `registry` and add it.
    ///
    /// Returns the name of the new thing.
    ///
    /// # Errors
    ///
    /// Everything [`DeviceRegistry::create`] and [`Self::add_thing`] can return.
    pub async fn instantiate(
        &self,
        registry: &DeviceRegistry<A::Command>,
        type_name: &str,
    ) -> Result<String, ThingError> {
        let thing = registry.create(type_name)?;
        let name = thing.name().to_string();
        self.add_thing(thing).await?;
        Ok(name)
    }

    /// Names of managed things, in the order they were added.
    #[must_use]
    pub fn thing_names(&self) -> Vec<String> {
        self.slots()
            .iter()
            .map(|slot| slot.name.clone())
            .collect()
    }

    /// Capability descriptions of every managed thing.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ThingDescriptor> {
        self.slots()
            .iter()
            .map(|slot| slot.with_thing(|thing| thing.descriptor()))
            .collect()
    }

    /// Capability description of one thing.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Thing`] for an unknown name.
    pub fn descriptor(&self, thing: &str) -> Result<ThingDescriptor, ThingError> {
        Ok(self.slot(thing)?.with_thing(|t| t.descriptor()))
    }

    /// Read one property of one thing.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Thing`] or [`NotFoundError::Property`].
    pub fn read_property(&self, thing: &str, property: &str) -> Result<Value, ThingError> {
        self.slot(thing)?.with_thing(|t| t.read_property(property))
    }

    /// Invoke `method` on `thing` and wait until its plan has fully run.
    ///
    /// # Errors
    ///
    /// - [`NotFoundError::Thing`] for an unknown thing.
    /// - Lookup, binding and handler errors; no command is issued.
    /// - [`ThingError::Hardware`] if a command fails mid-plan. Commands issued
    ///   before the failure are not rolled back.
    #[tracing::instrument(skip(self, arguments), fields(invocation = tracing::field::Empty))]
    pub async fn invoke_method(
        &self,
        thing: &str,
        method: &str,
        arguments: Arguments,
    ) -> Result<InvocationOutcome, ThingError> {
        let id = InvocationId::new();
        tracing::Span::current().record("invocation", tracing::field::display(id));

        let slot = self.slot(thing)?;
        let _turn = slot.turn.lock().await;

        let plan = slot
            .with_thing(|t| t.invoke_method(method, arguments))
            .inspect_err(|err| tracing::warn!(error = %err, code = err.code(), "invocation rejected"))?;
        let (steps, result) = plan.into_parts();
        tracing::debug!(steps = steps.len(), "executing plan");
        execute_plan(&self.actuator, steps).await?;

        tracing::debug!("invocation complete");
        Ok(InvocationOutcome {
            id,
            thing: slot.name.clone(),
            method: method.to_string(),
            result,
        })
    }

    /// Invoke a method from a JSON command
    /// `{"name": thing, "method": method, "parameters": {...}}`.
    ///
    /// # Errors
    ///
    /// [`ThingError::MalformedCommand`] if the payload does not have that
    /// shape, [`thingkit_domain::error::ArgumentError::Unsupported`] for
    /// non-scalar parameters, then everything [`Self::invoke_method`] returns.
    pub async fn invoke_command(
        &self,
        command: serde_json::Value,
    ) -> Result<InvocationOutcome, ThingError> {
        let command: Command =
            serde_json::from_value(command).map_err(ThingError::MalformedCommand)?;
        let arguments = Arguments::from_json(command.parameters)?;
        self.invoke_method(&command.name, &command.method, arguments)
            .await
    }

    /// Snapshot every managed thing.
    ///
    /// With `delta`, only things whose properties changed since the previous
    /// delta report are included; the first delta report includes all of
    /// them. Full reports do not affect what the next delta report compares
    /// against.
    #[must_use]
    pub fn states(&self, delta: bool) -> Vec<StateSnapshot> {
        let snapshots = self
            .slots()
            .into_iter()
            .map(|slot| slot.with_thing(|t| t.snapshot()));
        if !delta {
            return snapshots.collect();
        }

        let mut last = self
            .last_reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        snapshots
            .filter(|snapshot| {
                let changed = last
                    .get(&snapshot.name)
                    .is_none_or(|previous| snapshot.differs_from(previous));
                if changed {
                    last.insert(snapshot.name.clone(), snapshot.properties.clone());
                }
                changed
            })
            .collect()
    }

    fn reserve(&self, name: &str) -> Result<Reservation<'_>, RegistrationError> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut starting = self.starting.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.iter().any(|slot| slot.name == name) || !starting.insert(name.to_string()) {
            return Err(RegistrationError::DuplicateThing(name.to_string()));
        }
        Ok(Reservation {
            starting: &self.starting,
            name: name.to_string(),
        })
    }

    fn slots(&self) -> Vec<Arc<Slot<A::Command>>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn find(&self, name: &str) -> Option<Arc<Slot<A::Command>>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|slot| slot.name == name)
            .cloned()
    }

    fn slot(&self, name: &str) -> Result<Arc<Slot<A::Command>>, NotFoundError> {
        self.find(name)
            .ok_or_else(|| NotFoundError::Thing(name.to_string()))
    }
}
