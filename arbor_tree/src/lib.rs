// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Tree: a name-resolved hierarchy of CLI components with bubbling events.
//!
//! Applications are built from three kinds of components:
//!
//! - a **root**, the top of an application, carrying its version;
//! - **modules**, commands or command groups, optionally executable;
//! - **libraries**, non-executable services shared with a parent and its other children.
//!
//! Every component declares its parent by *name*. Components may be registered in any order:
//! a child registered before its parent waits as an orphan and is adopted as soon as the
//! parent is registered. The resulting tree is the same either way.
//!
//! ## Events
//!
//! Each component owns an [`EventEmitter`]. [`Registry::emit`] delivers an event to the
//! component first and then to each ancestor up to the root; events never travel to
//! descendants. [`Registry::run`] wraps execution in the [`BEFORE_RUN`] / [`AFTER_RUN`]
//! envelope, and every registration is announced on the registry's own emitter as
//! [`COMPONENT_REGISTERED`].
//!
//! ## Identity and lifecycle
//!
//! The [`Registry`] owns all components and hands out [`ComponentId`]s. It is an explicit value:
//! tests build a fresh one per scenario, and [`Registry::clear`] resets it, turning every
//! previously issued id stale. Registering a name twice is allowed; the latest registration
//! wins lookups by name.
//!
//! ## Diagnostics
//!
//! Resolution is reported through [`tracing`](https://docs.rs/tracing): a `warn` event when a
//! declared parent cannot be found or would create a cycle, `debug` events for registrations
//! and links. Install a subscriber to see them.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use arbor_tree::{ComponentDesc, Phase, Registry, Value, listener};
//!
//! let mut registry = Registry::new();
//! let m2 = registry.register(ComponentDesc::module("m2").parent("m1")).unwrap();
//! let m1 = registry.register(ComponentDesc::module("m1").parent("app")).unwrap();
//! let app = registry.register(ComponentDesc::root("app")).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! for id in [app, m1] {
//!     let seen = seen.clone();
//!     registry
//!         .on(id, "test:event", listener(move |args: &[Value]| {
//!             seen.borrow_mut().push((id, args.to_vec()));
//!             Ok(())
//!         }), Phase::Post)
//!         .unwrap();
//! }
//!
//! registry.emit(m2, "test:event", &[Value::from("m2"), Value::from("data")]).unwrap();
//! let order: Vec<_> = seen.borrow().iter().map(|(id, _)| *id).collect();
//! assert_eq!(order, [m1, app]);
//! ```

pub mod error;
pub mod handler;
pub mod registry;
mod resolve;
mod run;
pub mod types;

pub use arbor_events::{BoxError, EmitError, EventEmitter, Listener, Phase, listener};
pub use error::Error;
pub use handler::{FnHandler, Handler, RunContext, handler_fn};
pub use registry::{Component, Registry};
pub use types::{
    AFTER_RUN, BEFORE_RUN, COMPONENT_REGISTERED, ComponentDesc, ComponentId, DEFAULT_VERSION,
    Kind, Value,
};
