// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by the component tree.

use arbor_events::{BoxError, EmitError};

use crate::types::ComponentId;

/// Errors from [`Registry`](crate::Registry) operations.
///
/// An unresolved declared parent is not an error: the component stays an orphan, a warning is
/// logged, and [`Registry::orphans`](crate::Registry::orphans) reports it. Registering a name
/// twice is not an error either; the latest registration wins.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A listener failed; the remaining listeners of that emission did not run.
    #[error(transparent)]
    Listener(#[from] EmitError),
    /// A component handler failed.
    #[error("handler for `{component}` failed")]
    Handler {
        /// Name of the component whose handler failed.
        component: String,
        /// Error returned by the handler.
        #[source]
        source: BoxError,
    },
    /// The requested link would make a component its own ancestor.
    #[error("attaching `{child}` under `{parent}` would create a cycle")]
    Cycle {
        /// Name of the would-be parent.
        parent: String,
        /// Name of the would-be child.
        child: String,
    },
    /// The id was issued before the registry was cleared.
    #[error("component id {0:?} is stale")]
    StaleComponent(ComponentId),
}
