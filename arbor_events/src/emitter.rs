// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Emitter implementation.
//!
//! ## Overview
//!
//! Keeps one listener list per event and phase, and delivers an emission
//! `Pre` → `Post`, each phase in registration order.
//!
//! ## Once listeners
//!
//! - A registration made with [`EventEmitter::once`] is removed right after it returns `Ok`,
//!   before the next listener runs.
//! - Only that registration is removed; other registrations of the same listener stay.
//! - A once listener that fails is kept, since it never completed.
//!
//! ## Failures
//!
//! Listener invocation is synchronous and sequential. The first listener that returns
//! `Err` aborts the emission and the error is returned to the caller of
//! [`EventEmitter::emit`]. There is no isolation between listeners.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::types::{EmitError, Listener, ListenerFlags, Phase};

struct Entry<P: ?Sized> {
    serial: u64,
    listener: Listener<P>,
    flags: ListenerFlags,
}

impl<P: ?Sized> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            serial: self.serial,
            listener: self.listener.clone(),
            flags: self.flags,
        }
    }
}

/// Two-phase event emitter.
///
/// ## Usage
///
/// - Register listeners with [`EventEmitter::on`] or [`EventEmitter::once`].
/// - Call [`EventEmitter::emit`] with the event name and a payload borrowed by every listener.
/// - Remove listeners with [`EventEmitter::off`], passing the same [`Listener`] handle.
///
/// The payload type may be unsized, so `EventEmitter<[T]>` hands each listener a `&[T]`.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use arbor_events::{EventEmitter, Phase, listener};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let mut emitter: EventEmitter<str> = EventEmitter::new();
///
/// let log = seen.clone();
/// emitter.once("greet", listener(move |who: &str| {
///     log.borrow_mut().push(who.to_string());
///     Ok(())
/// }), Phase::Post);
///
/// assert!(emitter.emit("greet", "ada").unwrap());
/// assert!(!emitter.emit("greet", "grace").unwrap());
/// assert_eq!(*seen.borrow(), ["ada"]);
/// ```
pub struct EventEmitter<P: ?Sized> {
    pre: BTreeMap<String, Vec<Entry<P>>>,
    post: BTreeMap<String, Vec<Entry<P>>>,
    next_serial: u64,
}

impl<P: ?Sized> Default for EventEmitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> core::fmt::Debug for EventEmitter<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let pre: usize = self.pre.values().map(Vec::len).sum();
        let post: usize = self.post.values().map(Vec::len).sum();
        f.debug_struct("EventEmitter")
            .field("events", &self.event_names())
            .field("pre_listeners", &pre)
            .field("post_listeners", &post)
            .finish_non_exhaustive()
    }
}

impl<P: ?Sized> EventEmitter<P> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            pre: BTreeMap::new(),
            post: BTreeMap::new(),
            next_serial: 0,
        }
    }

    /// Register `listener` for `event` in `phase`.
    ///
    /// There is no uniqueness check: registering the same listener twice makes it run twice per emission.
    pub fn on(&mut self, event: &str, listener: Listener<P>, phase: Phase) {
        self.push(event, listener, phase, ListenerFlags::empty());
    }

    /// Register `listener` for a single invocation of `event` in `phase`.
    pub fn once(&mut self, event: &str, listener: Listener<P>, phase: Phase) {
        self.push(event, listener, phase, ListenerFlags::ONCE);
    }

    /// Remove the first registration of `listener` for `event` in `phase`.
    ///
    /// Removing a listener that is not registered, or from an unknown event, does nothing.
    /// Returns whether a registration was removed.
    pub fn off(&mut self, event: &str, listener: &Listener<P>, phase: Phase) -> bool {
        let lists = self.lists_mut(phase);
        let Some(list) = lists.get_mut(event) else {
            return false;
        };
        let Some(pos) = list
            .iter()
            .position(|e| Rc::ptr_eq(&e.listener, listener))
        else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            lists.remove(event);
        }
        true
    }

    /// Remove every listener for `event` in both phases.
    pub fn remove_all(&mut self, event: &str) {
        self.pre.remove(event);
        self.post.remove(event);
    }

    /// Emit `event`, passing `payload` to every listener.
    ///
    /// Runs `Pre` listeners then `Post` listeners, each in registration order. Listeners
    /// registered while the emission is running are not part of it.
    ///
    /// Returns `Ok(true)` if at least one listener was registered for `event` when the
    /// call started, `Ok(false)` otherwise.
    pub fn emit(&mut self, event: &str, payload: &P) -> Result<bool, EmitError> {
        let pre = self.snapshot(event, Phase::Pre);
        let post = self.snapshot(event, Phase::Post);
        if pre.is_empty() && post.is_empty() {
            return Ok(false);
        }
        for (phase, entries) in [(Phase::Pre, pre), (Phase::Post, post)] {
            for entry in entries {
                (entry.listener)(payload).map_err(|source| EmitError {
                    event: event.to_string(),
                    source,
                })?;
                if entry.flags.contains(ListenerFlags::ONCE) {
                    self.remove_serial(event, phase, entry.serial);
                }
            }
        }
        Ok(true)
    }

    /// Return a snapshot of the listeners registered for `event` in `phase`.
    ///
    /// The returned list is independent of later registrations and removals.
    pub fn listeners(&self, event: &str, phase: Phase) -> Vec<Listener<P>> {
        self.lists(phase)
            .get(event)
            .map(|list| list.iter().map(|e| e.listener.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of registrations for `event` in `phase`.
    pub fn listener_count(&self, event: &str, phase: Phase) -> usize {
        self.lists(phase).get(event).map_or(0, Vec::len)
    }

    /// Names of all events with at least one listener in either phase.
    pub fn event_names(&self) -> BTreeSet<String> {
        self.pre.keys().chain(self.post.keys()).cloned().collect()
    }

    /// Returns true if no listener is registered at all.
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    // --- internals ---

    fn push(&mut self, event: &str, listener: Listener<P>, phase: Phase, flags: ListenerFlags) {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.lists_mut(phase)
            .entry(event.to_string())
            .or_default()
            .push(Entry {
                serial,
                listener,
                flags,
            });
    }

    fn snapshot(&self, event: &str, phase: Phase) -> Vec<Entry<P>> {
        self.lists(phase).get(event).cloned().unwrap_or_default()
    }

    fn remove_serial(&mut self, event: &str, phase: Phase, serial: u64) {
        let lists = self.lists_mut(phase);
        if let Some(list) = lists.get_mut(event) {
            list.retain(|e| e.serial != serial);
            if list.is_empty() {
                lists.remove(event);
            }
        }
    }

    fn lists(&self, phase: Phase) -> &BTreeMap<String, Vec<Entry<P>>> {
        match phase {
            Phase::Pre => &self.pre,
            Phase::Post => &self.post,
        }
    }

    fn lists_mut(&mut self, phase: Phase) -> &mut BTreeMap<String, Vec<Entry<P>>> {
        match phase {
            Phase::Pre => &mut self.pre,
            Phase::Post => &mut self.post,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoxError, listener};
    use alloc::vec;
    use core::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, tag: &'static str) -> Listener<str> {
        let log = log.clone();
        listener(move |data: &str| {
            log.borrow_mut().push(alloc::format!("{tag}:{data}"));
            Ok(())
        })
    }

    #[test]
    fn new_emitter_has_no_events() {
        let emitter: EventEmitter<str> = EventEmitter::new();
        assert!(emitter.event_names().is_empty());
        assert!(emitter.is_empty());
    }

    #[test]
    fn on_registers_in_each_phase() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        let l = recorder(&log, "a");
        emitter.on("test", l.clone(), Phase::Post);
        emitter.on("pre-test", l.clone(), Phase::Pre);

        assert!(emitter.event_names().contains("test"));
        assert!(emitter.event_names().contains("pre-test"));
        assert!(
            emitter
                .listeners("test", Phase::Post)
                .iter()
                .any(|x| Rc::ptr_eq(x, &l))
        );
        assert!(
            emitter
                .listeners("pre-test", Phase::Pre)
                .iter()
                .any(|x| Rc::ptr_eq(x, &l))
        );
        assert!(emitter.listeners("test", Phase::Pre).is_empty());
    }

    #[test]
    fn off_removes_and_tolerates_absent() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        let l = recorder(&log, "a");
        emitter.on("test", l.clone(), Phase::Post);

        assert!(emitter.off("test", &l, Phase::Post));
        assert!(emitter.listeners("test", Phase::Post).is_empty());
        assert!(!emitter.event_names().contains("test"));

        // Absent listener and absent event are both no-ops.
        assert!(!emitter.off("test", &l, Phase::Post));
        assert!(!emitter.off("non-existent", &l, Phase::Post));
    }

    #[test]
    fn off_only_touches_requested_phase() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        let l = recorder(&log, "a");
        emitter.on("test", l.clone(), Phase::Pre);

        assert!(!emitter.off("test", &l, Phase::Post));
        assert_eq!(emitter.listener_count("test", Phase::Pre), 1);
    }

    #[test]
    fn off_removes_first_of_duplicates() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        let l = recorder(&log, "a");
        emitter.on("test", l.clone(), Phase::Post);
        emitter.on("test", l.clone(), Phase::Post);

        emitter.emit("test", "x").unwrap();
        assert_eq!(log.borrow().len(), 2, "duplicate registration runs twice");

        emitter.off("test", &l, Phase::Post);
        assert_eq!(emitter.listener_count("test", Phase::Post), 1);
        emitter.emit("test", "y").unwrap();
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn once_fires_exactly_once() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        let l = recorder(&log, "once");
        emitter.once("test", l.clone(), Phase::Post);

        assert!(emitter.emit("test", "first").unwrap());
        assert!(!emitter.emit("test", "second").unwrap());

        assert_eq!(*log.borrow(), vec!["once:first"]);
        assert!(
            !emitter
                .listeners("test", Phase::Post)
                .iter()
                .any(|x| Rc::ptr_eq(x, &l))
        );
        assert!(!emitter.event_names().contains("test"));
        assert!(emitter.is_empty());
    }

    #[test]
    fn once_removes_only_its_own_registration() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        let l = recorder(&log, "l");
        emitter.on("test", l.clone(), Phase::Post);
        emitter.once("test", l.clone(), Phase::Post);

        emitter.emit("test", "1").unwrap();
        emitter.emit("test", "2").unwrap();
        assert_eq!(*log.borrow(), vec!["l:1", "l:1", "l:2"]);
        assert_eq!(emitter.listener_count("test", Phase::Post), 1);
    }

    #[test]
    fn pre_runs_before_post_in_registration_order() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        emitter.on("test", recorder(&log, "post1"), Phase::Post);
        emitter.on("test", recorder(&log, "pre1"), Phase::Pre);
        emitter.on("test", recorder(&log, "post2"), Phase::Post);
        emitter.on("test", recorder(&log, "pre2"), Phase::Pre);

        emitter.emit("test", "d").unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["pre1:d", "pre2:d", "post1:d", "post2:d"]
        );
    }

    #[test]
    fn emit_reports_whether_listeners_existed() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        assert!(!emitter.emit("test", "data").unwrap());

        emitter.on("test", recorder(&log, "a"), Phase::Pre);
        assert!(emitter.emit("test", "data").unwrap());
    }

    #[test]
    fn failing_listener_aborts_the_rest() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        emitter.on("test", recorder(&log, "first"), Phase::Pre);
        let failing: Listener<str> = listener(|_: &str| Err(BoxError::from("nope")));
        emitter.once("test", failing.clone(), Phase::Pre);
        emitter.on("test", recorder(&log, "never"), Phase::Post);

        let err = emitter.emit("test", "x").unwrap_err();
        assert_eq!(err.event, "test");
        assert_eq!(*log.borrow(), vec!["first:x"]);
        // The failing once listener did not complete, so it stays registered.
        assert_eq!(emitter.listener_count("test", Phase::Pre), 2);
    }

    #[test]
    fn listeners_snapshot_is_independent() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        let l = recorder(&log, "a");
        emitter.on("test", l.clone(), Phase::Post);
        let snapshot = emitter.listeners("test", Phase::Post);
        emitter.off("test", &l, Phase::Post);
        assert_eq!(snapshot.len(), 1);
        assert!(emitter.listeners("test", Phase::Post).is_empty());
    }

    #[test]
    fn slice_payloads() {
        let total = Rc::new(RefCell::new(0_i64));
        let mut emitter: EventEmitter<[i64]> = EventEmitter::new();
        let t = total.clone();
        emitter.on(
            "sum",
            listener(move |xs: &[i64]| {
                *t.borrow_mut() += xs.iter().sum::<i64>();
                Ok(())
            }),
            Phase::Post,
        );
        emitter.emit("sum", &[1, 2, 3]).unwrap();
        assert_eq!(*total.borrow(), 6);
    }

    #[test]
    fn remove_all_clears_both_phases() {
        let log = Log::default();
        let mut emitter: EventEmitter<str> = EventEmitter::new();
        emitter.on("test", recorder(&log, "a"), Phase::Pre);
        emitter.on("test", recorder(&log, "b"), Phase::Post);
        emitter.remove_all("test");
        assert!(emitter.is_empty());
        assert!(!emitter.emit("test", "x").unwrap());
    }
}
