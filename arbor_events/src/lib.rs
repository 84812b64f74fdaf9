// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Events: a deterministic, `no_std` event emitter with pre/post phases.
//!
//! ## Overview
//!
//! [`EventEmitter`] keeps listener lists per event name and per [`Phase`].
//! An emission runs every `Pre` listener, then every `Post` listener, each phase in registration order.
//! It does not know about trees; [`arbor_tree`](https://docs.rs/arbor_tree) composes one emitter per component and
//! performs the bubbling to ancestors on top of it.
//!
//! ## Listeners
//!
//! A [`Listener`] is an `Rc<dyn Fn(&P) -> Result<(), BoxError>>`.
//! Identity is the `Rc` pointer, so the same closure may be registered several times and is invoked once per registration.
//! [`EventEmitter::off`] removes the first matching registration.
//!
//! ## Once listeners
//!
//! [`EventEmitter::once`] registers with [`ListenerFlags::ONCE`]. The registration is dropped right after
//! its first successful invocation, before the next listener runs, and is absent from
//! [`EventEmitter::listeners`] afterwards.
//!
//! ## Failures
//!
//! Listeners are called synchronously. An `Err` from a listener stops the emission and is returned as [`EmitError`].
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use arbor_events::{EventEmitter, Phase, listener};
//!
//! let order = Rc::new(Cell::new(0_u32));
//! let mut emitter: EventEmitter<[i32]> = EventEmitter::new();
//!
//! let o = order.clone();
//! emitter.on("save", listener(move |_: &[i32]| { o.set(o.get() * 10 + 2); Ok(()) }), Phase::Post);
//! let o = order.clone();
//! emitter.on("save", listener(move |_: &[i32]| { o.set(o.get() * 10 + 1); Ok(()) }), Phase::Pre);
//!
//! assert!(emitter.emit("save", &[1, 2]).unwrap());
//! assert_eq!(order.get(), 12, "pre listeners run first");
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod emitter;
pub mod types;

pub use emitter::EventEmitter;
pub use types::{BoxError, EmitError, Listener, ListenerFlags, Phase, listener};
