// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration and parent resolution.
//!
//! A component may declare its parent by name before or after that parent exists. Both
//! directions go through the same idempotent resolution step:
//!
//! - on its own registration, a component looks its declared parent up by name;
//! - on every registration, components waiting for the new name are adopted, in
//!   registration order.
//!
//! The declared parent name is cleared on attach, so a component is resolved at most once and
//! a later registration under the same parent name cannot take the child away.

use arbor_events::EventEmitter;
use indexmap::IndexMap;

use crate::error::Error;
use crate::registry::{Component, Registry};
use crate::types::{COMPONENT_REGISTERED, ComponentDesc, ComponentId, Value};

/// Outcome of a single resolution attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// No declared parent left to resolve.
    Settled,
    /// Attached to the declared parent.
    Attached,
    /// The declared parent is not registered (yet).
    Pending,
    /// The declared parent exists, but attaching would create a cycle.
    Rejected,
}

impl Registry {
    /// Register a component described by `desc` and return its id.
    ///
    /// In order:
    ///
    /// 1. The name is bound to the new id; an earlier component with the same name stays
    ///    alive but is no longer reachable by name.
    /// 2. [`COMPONENT_REGISTERED`] is emitted on the registry emitter.
    /// 3. The declared parent is resolved if it is registered. Otherwise the component stays an
    ///    orphan and a warning is logged.
    /// 4. Orphans declaring the new name as their parent are adopted.
    ///
    /// Nested children added with [`ComponentDesc::child`] are registered next and attached
    /// to the new component.
    ///
    /// If a registration listener fails, registration still completes and the listener
    /// error is returned; the component remains reachable through [`Registry::get`].
    ///
    /// ```
    /// use arbor_tree::{ComponentDesc, Registry};
    ///
    /// let mut registry = Registry::new();
    /// // The child comes first: it waits for its parent.
    /// let child = registry.register(ComponentDesc::module("child").parent("parent")).unwrap();
    /// assert_eq!(registry.component(child).unwrap().parent(), None);
    ///
    /// let parent = registry.register(ComponentDesc::root("parent")).unwrap();
    /// assert_eq!(registry.component(child).unwrap().parent(), Some(parent));
    /// assert_eq!(registry.child(parent, "child"), Some(child));
    /// ```
    pub fn register(&mut self, desc: ComponentDesc) -> Result<ComponentId, Error> {
        let mut first_err = None;
        let id = self.register_one(desc, None, &mut first_err);
        match first_err {
            Some(err) => Err(err),
            None => Ok(id),
        }
    }

    /// Register `desc`. With `owner`, the component is a nested child: it is attached to
    /// `owner` and its declared parent is ignored.
    fn register_one(
        &mut self,
        desc: ComponentDesc,
        owner: Option<ComponentId>,
        first_err: &mut Option<Error>,
    ) -> ComponentId {
        let ComponentDesc {
            name,
            description,
            parent,
            kind,
            handler,
            children,
        } = desc;

        #[allow(
            clippy::cast_possible_truncation,
            reason = "registries never hold more than u32::MAX components"
        )]
        let id = ComponentId::new(self.nodes.len() as u32, self.epoch);
        self.nodes.push(Component {
            id,
            name: name.clone(),
            description,
            declared_parent: parent.filter(|_| owner.is_none()),
            parent: None,
            children: IndexMap::new(),
            emitter: EventEmitter::new(),
            kind,
            handler,
        });

        // 1. name table
        if let Some(prev) = self.names.insert(name.clone(), id) {
            tracing::debug!(name = %name, ?prev, "name re-registered; latest registration wins");
        }
        tracing::debug!(
            name = %name,
            kind = self.nodes[id.idx()].kind.label(),
            "registered component"
        );

        // 2. registry-level notification
        if let Err(err) = self.events.emit(COMPONENT_REGISTERED, &[Value::Component(id)]) {
            first_err.get_or_insert(err.into());
        }

        // 3. own parent
        if let Some(owner) = owner {
            if let Err(err) = self.add_child(owner, id) {
                tracing::warn!(%err, "nested child not attached");
            }
        } else if self.try_resolve(id) == Resolution::Pending {
            tracing::warn!(
                component = %name,
                parent = self.nodes[id.idx()].declared_parent.as_deref().unwrap_or_default(),
                "parent not found; component stays unattached until it is registered"
            );
        }

        // 4. adopt orphans waiting for this name
        self.adopt_orphans(id);

        for child_desc in children {
            self.register_one(child_desc, Some(id), first_err);
        }
        id
    }

    /// Attach `id` to its declared parent if possible. Idempotent.
    pub(crate) fn try_resolve(&mut self, id: ComponentId) -> Resolution {
        let node = &self.nodes[id.idx()];
        if node.parent.is_some() {
            return Resolution::Settled;
        }
        let Some(declared) = node.declared_parent.as_deref() else {
            return Resolution::Settled;
        };
        let Some(parent) = self.names.get(declared).copied() else {
            return Resolution::Pending;
        };
        match self.add_child(parent, id) {
            Ok(()) => Resolution::Attached,
            Err(err) => {
                tracing::warn!(%err, "declared parent rejected; component stays unattached");
                Resolution::Rejected
            }
        }
    }

    fn adopt_orphans(&mut self, parent: ComponentId) {
        let name = self.nodes[parent.idx()].name.clone();
        let waiting: Vec<ComponentId> = self
            .nodes
            .iter()
            .filter(|n| n.id != parent && n.declared_parent.as_deref() == Some(name.as_str()))
            .map(|n| n.id)
            .filter(|&id| self.is_registered(id))
            .collect();
        for orphan in waiting {
            self.try_resolve(orphan);
        }
    }

    /// Components whose declared parent is still unresolved, in registration order.
    ///
    /// Components shadowed by a later registration of the same name are not listed.
    pub fn orphans(&self) -> Vec<ComponentId> {
        self.nodes
            .iter()
            .filter(|n| n.declared_parent.is_some() && n.parent.is_none())
            .map(|n| n.id)
            .filter(|&id| self.is_registered(id))
            .collect()
    }

    /// Retry every orphan; returns the number of components attached.
    ///
    /// Useful after links that blocked a resolution (for example a rejected cycle) were
    /// changed with [`Registry::add_child`].
    pub fn resolve_pending(&mut self) -> usize {
        let mut attached = 0;
        for id in self.orphans() {
            if self.try_resolve(id) == Resolution::Attached {
                attached += 1;
            }
        }
        tracing::debug!(attached, "resolved pending components");
        attached
    }
}
