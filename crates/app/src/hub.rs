//! Hub-facing request/response surface.
//!
//! A [`Hub`] answers [`HubRequest`]s with [`HubResponse`]s on top of a
//! [`ThingManager`]. Both are plain JSON documents, so any transport that
//! moves JSON (a console, a socket, a test) can drive it.
//!
//! ```json
//! {"id": 1, "type": "invoke", "thing": "Tank", "method": "SetSpeed", "parameters": {"speed": 40}}
//! {"id": 1, "status": "ok", "result": {"id": "…", "thing": "Tank", "method": "SetSpeed"}}
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thingkit_domain::error::ThingError;
use thingkit_domain::parameter::Arguments;

use crate::ports::Actuator;
use crate::services::thing_manager::ThingManager;

/// A request from the hub, optionally correlated by `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HubRequest {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub call: HubCall,
}

impl HubRequest {
    /// Parse one JSON request.
    ///
    /// # Errors
    ///
    /// Text that is not a valid request yields the `malformed_command` error
    /// response to send back, without an id.
    pub fn from_line(line: &str) -> Result<Self, HubResponse> {
        serde_json::from_str(line).map_err(|err| {
            tracing::warn!(error = %err, "malformed hub request");
            HubResponse::error(None, &ThingError::MalformedCommand(err))
        })
    }

    /// The thing this request invokes a method on, if it is an invocation.
    #[must_use]
    pub fn invoked_thing(&self) -> Option<&str> {
        match &self.call {
            HubCall::Invoke { thing, .. } => Some(thing),
            _ => None,
        }
    }
}

/// What the hub asks for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubCall {
    /// Names of all managed things.
    List,
    /// Capability descriptors of all managed things.
    Describe,
    /// State snapshots, optionally only the ones that changed.
    States {
        #[serde(default)]
        delta: bool,
    },
    /// One property of one thing.
    Read { thing: String, property: String },
    /// Invoke a method with named arguments.
    Invoke {
        thing: String,
        method: String,
        #[serde(default)]
        parameters: serde_json::Value,
    },
}

/// Response to a [`HubRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HubResponse {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<serde_json::Value>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        code: String,
        message: String,
    },
}

impl HubResponse {
    fn ok(id: Option<u64>, result: &impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Self::Ok {
                id,
                result: Some(result),
            },
            Err(err) => Self::Error {
                id,
                code: "serialization".to_string(),
                message: err.to_string(),
            },
        }
    }

    fn error(id: Option<u64>, err: &ThingError) -> Self {
        Self::Error {
            id,
            code: err.code().to_string(),
            message: error_chain(err),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Ok { id, .. } | Self::Error { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Serialize as one JSON line, without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(r#"{{"status":"error","code":"serialization","message":"{err}"}}"#)
        })
    }
}

/// Join an error and its sources into one line.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Dispatches hub requests to a [`ThingManager`].
pub struct Hub<A: Actuator> {
    manager: Arc<ThingManager<A>>,
}

impl<A: Actuator> Clone for Hub<A> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<A> Hub<A>
where
    A: Actuator,
    A::Command: fmt::Debug + Send + Sync + 'static,
{
    pub fn new(manager: Arc<ThingManager<A>>) -> Self {
        Self { manager }
    }

    /// Answer one request.
    pub async fn handle(&self, request: HubRequest) -> HubResponse {
        let id = request.id;
        let manager = &self.manager;
        match request.call {
            HubCall::List => HubResponse::ok(id, &manager.thing_names()),
            HubCall::Describe => HubResponse::ok(id, &manager.descriptors()),
            HubCall::States { delta } => HubResponse::ok(id, &manager.states(delta)),
            HubCall::Read { thing, property } => match manager.read_property(&thing, &property) {
                Ok(value) => HubResponse::ok(id, &value),
                Err(err) => HubResponse::error(id, &err),
            },
            HubCall::Invoke {
                thing,
                method,
                parameters,
            } => {
                let outcome = match Arguments::from_json(parameters) {
                    Ok(arguments) => manager.invoke_method(&thing, &method, arguments).await,
                    Err(err) => Err(err.into()),
                };
                match outcome {
                    Ok(outcome) => HubResponse::ok(id, &outcome),
                    Err(err) => HubResponse::error(id, &err),
                }
            }
        }
    }

    /// Answer one request given as JSON text and return the JSON response.
    ///
    /// Text that is not a valid request yields a `malformed_command` error
    /// response without an id.
    pub async fn handle_json(&self, line: &str) -> String {
        let response = match HubRequest::from_line(line) {
            Ok(request) => self.handle(request).await,
            Err(response) => response,
        };
        response.to_line()
    }
}
