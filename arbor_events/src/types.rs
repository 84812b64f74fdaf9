// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the emitter: phases, listener flags, listeners, and errors.
//!
//! ## Overview
//!
//! These types describe how listeners are registered and how failures surface.
//! They are referenced by the [`emitter`](crate::emitter) and re-exported by downstream crates.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;

/// Phases of event delivery.
///
/// Every [`emit`](crate::emitter::EventEmitter::emit) runs all `Pre` listeners
/// for the event before any `Post` listener.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Phase {
    /// Runs before the post phase; intended for middleware-style listeners.
    Pre,
    /// The regular phase. This is the default.
    #[default]
    Post,
}

bitflags::bitflags! {
    /// Per-registration listener options.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ListenerFlags: u8 {
        /// Remove the registration after its first successful invocation.
        const ONCE = 0b0000_0001;
    }
}

/// Error type listeners may return.
///
/// Any error type can be boxed into this with `?` or `.into()`.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// A registered event listener.
///
/// Listeners are compared by pointer identity: keep a clone of the [`Rc`] you
/// registered to remove it again with
/// [`EventEmitter::off`](crate::emitter::EventEmitter::off).
pub type Listener<P> = Rc<dyn Fn(&P) -> Result<(), BoxError>>;

/// Wrap a closure as a [`Listener`].
///
/// This mostly exists to help type inference for closures over unsized payloads such as `[T]`.
pub fn listener<P, F>(f: F) -> Listener<P>
where
    P: ?Sized,
    F: Fn(&P) -> Result<(), BoxError> + 'static,
{
    Rc::new(f)
}

/// A listener failed while an event was being emitted.
///
/// Returned by [`EventEmitter::emit`](crate::emitter::EventEmitter::emit). Listeners after the
/// failing one were not invoked for that emission.
#[derive(Debug, thiserror::Error)]
#[error("listener for `{event}` failed")]
pub struct EmitError {
    /// Name of the event being emitted.
    pub event: String,
    /// Error returned by the listener.
    #[source]
    pub source: BoxError,
}
