// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the component tree: identifiers, kinds, values, and descriptions.

use std::fmt;
use std::rc::Rc;

use crate::handler::Handler;

/// Emitted on a component right before its run behavior executes. Payload: `[Component(id)]`.
pub const BEFORE_RUN: &str = "before:run";

/// Emitted on a component after its run behavior returned. Payload: `[Component(id), result]`.
pub const AFTER_RUN: &str = "after:run";

/// Emitted on the registry emitter for every registration. Payload: `[Component(id)]`.
pub const COMPONENT_REGISTERED: &str = "component:registered";

/// Version given to roots that do not set one.
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Identifier for a component in a [`Registry`](crate::Registry).
///
/// A small, copyable handle made of an arena slot and the registry epoch it was issued in.
///
/// ## Semantics
///
/// - Slots are never reused while the registry lives; ids stay valid until [`Registry::clear`](crate::Registry::clear).
/// - `clear` advances the epoch, so ids issued before it are stale and never alias a component registered afterwards.
/// - Identity is by id, not by name: two registrations under the same name yield two distinct ids.
///
/// Use [`Registry::is_alive`](crate::Registry::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32, pub(crate) u32);

impl ComponentId {
    pub(crate) const fn new(idx: u32, epoch: u32) -> Self {
        Self(idx, epoch)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn epoch(self) -> u32 {
        self.1
    }
}

/// Variant of a component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Top-level component of an application.
    Root {
        /// Application version, shown in the usage summary.
        version: String,
    },
    /// A command or command group.
    Module {
        /// Whether running the module executes its handler.
        executable: bool,
    },
    /// A non-executable component exposing a shared service to its parent and siblings.
    Library,
}

impl Kind {
    /// Short lowercase label, used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Root { .. } => "root",
            Self::Module { .. } => "module",
            Self::Library => "library",
        }
    }
}

/// Payload items and run results.
///
/// `Null` stands for "no value".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A string.
    Str(String),
    /// A reference to a component.
    Component(ComponentId),
    /// A list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The referenced component, if this is a [`Value::Component`].
    pub fn as_component(&self) -> Option<ComponentId> {
        match self {
            Self::Component(id) => Some(*id),
            _ => None,
        }
    }

    /// The string, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
            Self::Component(id) => write!(f, "<component {}>", id.0),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<ComponentId> for Value {
    fn from(id: ComponentId) -> Self {
        Self::Component(id)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

/// Description of a component to register.
///
/// Build one with [`ComponentDesc::root`], [`ComponentDesc::module`] or [`ComponentDesc::library`],
/// then pass it to [`Registry::register`](crate::Registry::register).
///
/// ```
/// use arbor_tree::{ComponentDesc, Kind};
///
/// let desc = ComponentDesc::module("list")
///     .description("List all users")
///     .parent("users");
/// assert_eq!(desc.name(), "list");
/// assert_eq!(desc.kind(), &Kind::Module { executable: true });
/// ```
pub struct ComponentDesc {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) parent: Option<String>,
    pub(crate) kind: Kind,
    pub(crate) handler: Option<Rc<dyn Handler>>,
    pub(crate) children: Vec<ComponentDesc>,
}

impl fmt::Debug for ComponentDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDesc")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parent", &self.parent)
            .field("kind", &self.kind)
            .field("has_handler", &self.handler.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl ComponentDesc {
    fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            description: None,
            parent: None,
            kind,
            handler: None,
            children: Vec::new(),
        }
    }

    /// An application root with version [`DEFAULT_VERSION`].
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(
            name,
            Kind::Root {
                version: DEFAULT_VERSION.to_owned(),
            },
        )
    }

    /// An executable module.
    pub fn module(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Module { executable: true })
    }

    /// A library.
    pub fn library(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Library)
    }

    /// Set the human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the parent by name.
    ///
    /// The parent does not need to exist yet; the link is made as soon as both are registered.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the version of a root. Has no effect on modules and libraries.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        if let Kind::Root { version: v } = &mut self.kind {
            *v = version.into();
        }
        self
    }

    /// Set whether a module executes its handler. Has no effect on roots and libraries.
    pub fn executable(mut self, executable: bool) -> Self {
        if let Kind::Module { executable: e } = &mut self.kind {
            *e = executable;
        }
        self
    }

    /// Attach the behavior object.
    ///
    /// For libraries the handler is never run; it is the service siblings reach through
    /// [`Registry::handler`](crate::Registry::handler).
    pub fn handler(mut self, handler: impl Handler) -> Self {
        self.handler = Some(Rc::new(handler));
        self
    }

    /// Attach an already shared behavior object.
    pub fn shared_handler(mut self, handler: Rc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Nest a child; it is registered right after this component and attached to it.
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Name of the component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant of the component.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_defaults() {
        let d = ComponentDesc::root("app");
        assert_eq!(
            d.kind(),
            &Kind::Root {
                version: DEFAULT_VERSION.into()
            }
        );
        assert!(d.description.is_none());
        assert!(d.parent.is_none());
    }

    #[test]
    fn variant_setters_only_touch_their_variant() {
        let lib = ComponentDesc::library("lib").version("9.9").executable(false);
        assert_eq!(lib.kind(), &Kind::Library);

        let module = ComponentDesc::module("m").version("9.9").executable(false);
        assert_eq!(module.kind(), &Kind::Module { executable: false });

        let root = ComponentDesc::root("r").version("1.2.3").executable(false);
        assert_eq!(
            root.kind(),
            &Kind::Root {
                version: "1.2.3".into()
            }
        );
    }

    #[test]
    fn value_conversions_and_display() {
        assert!(Value::default().is_null());
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(7_i64).as_int(), Some(7));
        let id = ComponentId::new(3, 0);
        assert_eq!(Value::from(id).as_component(), Some(id));
        let list = Value::from(vec![Value::from(true), Value::Null, Value::from("a")]);
        assert_eq!(list.to_string(), "[true, null, a]");
    }
}
