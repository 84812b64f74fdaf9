// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core registry implementation: arena, name table, links, and bubbling.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use arbor_events::{EventEmitter, Listener, Phase};
use indexmap::IndexMap;

use crate::error::Error;
use crate::handler::Handler;
use crate::types::{ComponentId, Kind, Value};

/// A node of the command hierarchy.
///
/// Components are owned by a [`Registry`] and borrowed through
/// [`Registry::component`]. Links are changed only through the registry so that the parent
/// pointer and the parent's child table always agree.
pub struct Component {
    pub(crate) id: ComponentId,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) declared_parent: Option<String>,
    pub(crate) parent: Option<ComponentId>,
    pub(crate) children: IndexMap<String, ComponentId>,
    pub(crate) emitter: EventEmitter<[Value]>,
    pub(crate) kind: Kind,
    pub(crate) handler: Option<Rc<dyn Handler>>,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("declared_parent", &self.declared_parent)
            .field("children", &self.children)
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}

impl Component {
    /// Id of this component.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Variant of the component.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Version of a root; `None` for modules and libraries.
    pub fn version(&self) -> Option<&str> {
        match &self.kind {
            Kind::Root { version } => Some(version),
            _ => None,
        }
    }

    /// Whether running this component executes its handler.
    ///
    /// Roots are executable, libraries never are.
    pub fn is_executable(&self) -> bool {
        match self.kind {
            Kind::Root { .. } => true,
            Kind::Module { executable } => executable,
            Kind::Library => false,
        }
    }

    /// Current parent, if attached.
    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    /// Declared parent name that is still waiting to be resolved.
    ///
    /// Cleared as soon as the component is attached to a parent.
    pub fn declared_parent(&self) -> Option<&str> {
        self.declared_parent.as_deref()
    }

    /// Child with the given name.
    pub fn child(&self, name: &str) -> Option<ComponentId> {
        self.children.get(name).copied()
    }

    /// Children in attachment order.
    pub fn children(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.children.values().copied()
    }

    /// Child names in attachment order.
    pub fn child_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.children.keys().map(String::as_str)
    }

    /// The child table, keyed by child name.
    pub fn children_by_name(&self) -> &IndexMap<String, ComponentId> {
        &self.children
    }

    /// This component's own emitter (no bubbling).
    pub fn emitter(&self) -> &EventEmitter<[Value]> {
        &self.emitter
    }
}

/// Registry of components.
///
/// Owns every component in an arena and maps names to ids. The registry is the shared state
/// that lets independently constructed components find their parent by name; it is an
/// explicit value, and [`Registry::clear`] resets it.
///
/// ## Usage
///
/// - [`Registry::register`] adds a component, wires its declared parent, and adopts
///   components that were waiting for it.
/// - [`Registry::get`] looks a component up by name; the latest registration under a name wins.
/// - [`Registry::emit`] emits on a component and bubbles to its ancestors.
/// - [`Registry::run`] executes a component inside the `before:run` / `after:run` envelope.
pub struct Registry {
    pub(crate) nodes: Vec<Component>,
    pub(crate) names: HashMap<String, ComponentId>,
    pub(crate) epoch: u32,
    pub(crate) events: EventEmitter<[Value]>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orphans = self
            .nodes
            .iter()
            .filter(|n| n.declared_parent.is_some())
            .count();
        f.debug_struct("Registry")
            .field("components", &self.nodes.len())
            .field("names", &self.names.len())
            .field("orphans", &orphans)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            names: HashMap::new(),
            epoch: 0,
            events: EventEmitter::new(),
        }
    }

    /// Drop every component.
    ///
    /// Ids issued before the call become stale. Listeners registered with
    /// [`Registry::on_registered`] are kept.
    pub fn clear(&mut self) {
        tracing::debug!(
            components = self.nodes.len(),
            epoch = self.epoch,
            "clearing registry"
        );
        self.nodes.clear();
        self.names.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Id currently registered under `name`.
    pub fn get(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name).copied()
    }

    /// Returns true if `id` refers to a component of the current epoch.
    pub fn is_alive(&self, id: ComponentId) -> bool {
        id.epoch() == self.epoch && id.idx() < self.nodes.len()
    }

    /// Borrow a component.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes.get(id.idx())
    }

    /// Number of components, including ones shadowed by a later registration of the same name.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing was registered since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All components in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> + '_ {
        self.nodes.iter()
    }

    /// Returns true if `id` is the component currently reachable under its name.
    pub fn is_registered(&self, id: ComponentId) -> bool {
        self.component(id)
            .is_some_and(|c| self.names.get(&c.name) == Some(&id))
    }

    /// Child of `parent` named `name`.
    pub fn child(&self, parent: ComponentId, name: &str) -> Option<ComponentId> {
        self.component(parent)?.child(name)
    }

    /// Children of `parent` in attachment order; empty for stale ids.
    pub fn children(&self, parent: ComponentId) -> Vec<ComponentId> {
        self.component(parent)
            .map(|c| c.children().collect())
            .unwrap_or_default()
    }

    /// Names of the children of `parent` in attachment order; empty for stale ids.
    pub fn child_names(&self, parent: ComponentId) -> Vec<&str> {
        self.component(parent)
            .map(|c| c.child_names().collect())
            .unwrap_or_default()
    }

    /// Path from the root of `id`'s tree down to `id` (inclusive).
    pub fn path(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut cur = self.component(id).map(|c| c.id);
        while let Some(c) = cur {
            out.push(c);
            cur = self.nodes[c.idx()].parent;
        }
        out.reverse();
        out
    }

    /// Attach `child` under `parent`.
    ///
    /// Sets the parent link, inserts the child into the parent's table under its name, and
    /// clears the child's declared parent so it is never resolved again.
    ///
    /// - If `child` already had another parent, it is moved: the old parent loses its entry.
    /// - If `parent` already had a different child with the same name, that child is detached.
    /// - Links that would make a component its own ancestor are rejected with [`Error::Cycle`].
    pub fn add_child(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), Error> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::Cycle {
                parent: self.nodes[parent.idx()].name.clone(),
                child: self.nodes[child.idx()].name.clone(),
            });
        }

        let name = self.nodes[child.idx()].name.clone();
        if let Some(old) = self.nodes[child.idx()].parent
            && old != parent
        {
            self.unlink(old, child);
        }
        if let Some(displaced) = self.nodes[parent.idx()].children.get(&name).copied()
            && displaced != child
        {
            tracing::debug!(
                parent = %self.nodes[parent.idx()].name,
                child = %name,
                "replacing child with the same name"
            );
            self.nodes[displaced.idx()].parent = None;
        }

        self.nodes[parent.idx()].children.insert(name, child);
        let node = &mut self.nodes[child.idx()];
        node.parent = Some(parent);
        node.declared_parent = None;
        tracing::debug!(
            parent = %self.nodes[parent.idx()].name,
            child = %self.nodes[child.idx()].name,
            "attached child"
        );
        Ok(())
    }

    /// Emit `event` on `id`, then on each of its ancestors up to the root.
    ///
    /// Every component runs its own `Pre` then `Post` listeners before the event moves to the
    /// parent. Events never travel to descendants. The first failing listener stops the
    /// whole propagation.
    ///
    /// Returns whether `id` itself had listeners for `event`.
    pub fn emit(&mut self, id: ComponentId, event: &str, payload: &[Value]) -> Result<bool, Error> {
        self.check(id)?;
        tracing::trace!(component = %self.nodes[id.idx()].name, event, "emit");
        let node = &mut self.nodes[id.idx()];
        let handled = node.emitter.emit(event, payload)?;
        let mut cur = node.parent;
        while let Some(p) = cur {
            let ancestor = &mut self.nodes[p.idx()];
            ancestor.emitter.emit(event, payload)?;
            cur = ancestor.parent;
        }
        Ok(handled)
    }

    /// Register `listener` for `event` on component `id`.
    pub fn on(
        &mut self,
        id: ComponentId,
        event: &str,
        listener: Listener<[Value]>,
        phase: Phase,
    ) -> Result<(), Error> {
        self.node_mut(id)?.emitter.on(event, listener, phase);
        Ok(())
    }

    /// Register a one-shot `listener` for `event` on component `id`.
    pub fn once(
        &mut self,
        id: ComponentId,
        event: &str,
        listener: Listener<[Value]>,
        phase: Phase,
    ) -> Result<(), Error> {
        self.node_mut(id)?.emitter.once(event, listener, phase);
        Ok(())
    }

    /// Remove the first registration of `listener` for `event` on component `id`.
    ///
    /// Returns whether a registration was removed.
    pub fn off(
        &mut self,
        id: ComponentId,
        event: &str,
        listener: &Listener<[Value]>,
        phase: Phase,
    ) -> Result<bool, Error> {
        Ok(self.node_mut(id)?.emitter.off(event, listener, phase))
    }

    /// Register a listener on the registry's own emitter for
    /// [`COMPONENT_REGISTERED`](crate::types::COMPONENT_REGISTERED).
    pub fn on_registered(&mut self, listener: Listener<[Value]>) {
        self.events
            .on(crate::types::COMPONENT_REGISTERED, listener, Phase::Post);
    }

    /// The registry's own emitter, separate from every component emitter.
    pub fn events_mut(&mut self) -> &mut EventEmitter<[Value]> {
        &mut self.events
    }

    // --- internals ---

    pub(crate) fn check(&self, id: ComponentId) -> Result<(), Error> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(Error::StaleComponent(id))
        }
    }

    pub(crate) fn node_mut(&mut self, id: ComponentId) -> Result<&mut Component, Error> {
        self.check(id)?;
        Ok(&mut self.nodes[id.idx()])
    }

    /// Returns true if `a` is `b` or one of `b`'s ancestors.
    fn is_ancestor_or_self(&self, a: ComponentId, b: ComponentId) -> bool {
        let mut cur = Some(b);
        while let Some(c) = cur {
            if c == a {
                return true;
            }
            cur = self.nodes[c.idx()].parent;
        }
        false
    }

    fn unlink(&mut self, parent: ComponentId, child: ComponentId) {
        let name = self.nodes[child.idx()].name.clone();
        let children = &mut self.nodes[parent.idx()].children;
        if children.get(&name) == Some(&child) {
            children.shift_remove(&name);
        }
        self.nodes[child.idx()].parent = None;
    }
}
