//! Registration table mapping action names to capabilities.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::ActionError;
use crate::relay::Params;

/// Action-defined fields of a successful result.
pub type Payload = Map<String, Value>;

/// Tagged result every capability returns.
pub type ActionResult = Result<Payload, ActionError>;

/// A registered capability.
pub type Capability<H> = Box<dyn Fn(&mut H, Params) -> ActionResult>;

/// Parameter type for actions that take no keywords.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArguments {}

/// Name-to-capability table built once at startup.
pub struct DispatchTable<H> {
    entries: BTreeMap<&'static str, Capability<H>>,
}

impl<H: 'static> DispatchTable<H> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers a handler whose keywords bind to `P`.
    ///
    /// Parameters that do not deserialize into `P` yield
    /// [`ActionError::InvalidArguments`] without invoking `handler`. A later
    /// registration under the same name replaces the earlier one.
    pub fn register<P, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        P: DeserializeOwned,
        F: Fn(&mut H, P) -> ActionResult + 'static,
    {
        self.register_raw(name, move |host, params| {
            let arguments = serde_json::from_value::<P>(Value::Object(params)).map_err(
                |source| ActionError::InvalidArguments {
                    action: name.to_owned(),
                    source,
                },
            )?;
            handler(host, arguments)
        })
    }

    /// Registers a handler that receives the raw keyword map.
    pub fn register_raw<F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        F: Fn(&mut H, Params) -> ActionResult + 'static,
    {
        self.entries.insert(name, Box::new(handler));
        self
    }
}

impl<H> DispatchTable<H> {
    /// Looks up the capability registered under `action`.
    #[must_use]
    pub fn resolve(&self, action: &str) -> Option<&Capability<H>> {
        self.entries.get(action)
    }

    /// Registered action names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Returns `true` when `action` is registered.
    #[must_use]
    pub fn contains(&self, action: &str) -> bool {
        self.entries.contains_key(action)
    }

    /// Number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: 'static> Default for DispatchTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for DispatchTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("actions", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
