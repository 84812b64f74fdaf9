// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavior objects attached to components.
//!
//! A component does not carry user code directly. It holds an optional [`Handler`] whose
//! [`run`](Handler::run) is invoked inside the `before:run` / `after:run` envelope by
//! [`Registry::run`](crate::Registry::run).
//!
//! Libraries keep a handler too, but it is never run. It is the shared service that parents and
//! siblings fetch with [`RunContext::library`] or [`Registry::handler`](crate::Registry::handler).

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use arbor_events::BoxError;

use crate::error::Error;
use crate::registry::{Component, Registry};
use crate::types::{ComponentId, Value};

/// User-supplied behavior of a component.
///
/// ```
/// use arbor_tree::{ComponentDesc, Handler, Registry, RunContext, Value, BoxError};
///
/// struct Greet;
///
/// impl Handler for Greet {
///     fn run(&self, _cx: &mut RunContext<'_>, args: &[String]) -> Result<Value, BoxError> {
///         Ok(Value::from(format!("hello {}", args.join(" "))))
///     }
/// }
///
/// let mut registry = Registry::new();
/// let greet = registry.register(ComponentDesc::module("greet").handler(Greet)).unwrap();
/// let out = registry.run(greet, &["ada".to_string()]).unwrap();
/// assert_eq!(out.as_str(), Some("hello ada"));
/// ```
pub trait Handler: Any {
    /// Execute the component's command logic.
    ///
    /// The default does nothing and returns [`Value::Null`], which suits library services.
    fn run(&self, cx: &mut RunContext<'_>, args: &[String]) -> Result<Value, BoxError> {
        let _ = (cx, args);
        Ok(Value::Null)
    }
}

/// A [`Handler`] backed by a closure. Created with [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut RunContext<'_>, &[String]) -> Result<Value, BoxError> + 'static,
{
    fn run(&self, cx: &mut RunContext<'_>, args: &[String]) -> Result<Value, BoxError> {
        (self.f)(cx, args)
    }
}

/// Wrap a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut RunContext<'_>, &[String]) -> Result<Value, BoxError> + 'static,
{
    FnHandler { f }
}

/// What a handler sees while it runs.
///
/// Gives access to the registry and to the running component, so a handler can list its
/// children, emit events that bubble from its component, or call a library service.
pub struct RunContext<'a> {
    registry: &'a mut Registry,
    id: ComponentId,
}

impl fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(registry: &'a mut Registry, id: ComponentId) -> Self {
        Self { registry, id }
    }

    /// Id of the running component.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The running component, or `None` if the handler cleared the registry.
    pub fn component(&self) -> Option<&Component> {
        self.registry.component(self.id)
    }

    /// Shared access to the registry.
    pub fn registry(&self) -> &Registry {
        &*self.registry
    }

    /// Exclusive access to the registry.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut *self.registry
    }

    /// Emit `event` from the running component; it bubbles to the ancestors.
    pub fn emit(&mut self, event: &str, payload: &[Value]) -> Result<bool, Error> {
        self.registry.emit(self.id, event, payload)
    }

    /// Fetch the service of a library named `name` among this component's children,
    /// then among its siblings.
    pub fn library<T: Handler>(&self, name: &str) -> Option<Rc<T>> {
        let own = self.registry.child(self.id, name);
        let sibling = || {
            let parent = self.registry.component(self.id)?.parent()?;
            self.registry.child(parent, name)
        };
        let found = own.or_else(sibling)?;
        self.registry.handler::<T>(found)
    }
}
