// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running components.

use std::any::Any;
use std::rc::Rc;

use crate::error::Error;
use crate::handler::{Handler, RunContext};
use crate::registry::Registry;
use crate::types::{AFTER_RUN, BEFORE_RUN, ComponentId, Value};

impl Registry {
    /// Run component `id` with `args`.
    ///
    /// Emits [`BEFORE_RUN`] with `[Component(id)]`, executes the component, then emits
    /// [`AFTER_RUN`] with `[Component(id), result]`. Both events bubble to the ancestors.
    ///
    /// - Roots run their handler, if any.
    /// - Modules run their handler when executable.
    /// - Libraries never run anything.
    ///
    /// Everything that does not run a handler yields [`Value::Null`]. A failing handler or
    /// listener stops the run immediately; `after:run` is then not emitted.
    pub fn run(&mut self, id: ComponentId, args: &[String]) -> Result<Value, Error> {
        self.check(id)?;
        self.emit(id, BEFORE_RUN, &[Value::Component(id)])?;

        let node = &self.nodes[id.idx()];
        let handler = node.handler.clone().filter(|_| node.is_executable());
        let result = match handler {
            Some(handler) => {
                let component = node.name.clone();
                tracing::debug!(%component, args = args.len(), "running handler");
                handler
                    .run(&mut RunContext::new(self, id), args)
                    .map_err(|source| Error::Handler { component, source })?
            }
            None => Value::Null,
        };

        self.emit(id, AFTER_RUN, &[Value::Component(id), result.clone()])?;
        Ok(result)
    }

    /// The handler of component `id` as a concrete type.
    ///
    /// This is how libraries expose their service:
    ///
    /// ```
    /// use arbor_tree::{ComponentDesc, Handler, Registry};
    ///
    /// struct Db {
    ///     url: &'static str,
    /// }
    /// impl Handler for Db {}
    ///
    /// let mut registry = Registry::new();
    /// let db = registry
    ///     .register(ComponentDesc::library("db").handler(Db { url: "mem://" }))
    ///     .unwrap();
    /// assert_eq!(registry.handler::<Db>(db).unwrap().url, "mem://");
    /// ```
    pub fn handler<T: Handler>(&self, id: ComponentId) -> Option<Rc<T>> {
        let handler: Rc<dyn Any> = self.component(id)?.handler.clone()?;
        handler.downcast::<T>().ok()
    }
}
