// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Dispatch: run an Arbor component tree from command-line tokens.
//!
//! [`Dispatcher`] walks the tree built by [`arbor_tree::Registry`] one token at a time and runs
//! the component it reaches with the leftover tokens as arguments. Without tokens it writes a
//! usage summary (see [`usage::render`]). Results map onto process exit codes with
//! [`exit_code`]: 0 on success, 1 on a missing or unknown command or any failure.
//!
//! Argument parsing beyond positional tokens is left to the handlers.
//!
//! ```no_run
//! use std::process::ExitCode;
//! use arbor_dispatch::{Dispatcher, exit_code};
//! use arbor_tree::{ComponentDesc, Registry};
//!
//! fn main() -> ExitCode {
//!     let mut registry = Registry::new();
//!     let app = registry.register(ComponentDesc::root("app")).unwrap();
//!     let tokens: Vec<String> = std::env::args().skip(1).collect();
//!     let result = Dispatcher::new(&mut registry, app).dispatch(&tokens);
//!     exit_code(&result)
//! }
//! ```

mod dispatcher;
mod error;
pub mod usage;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, exit_code, exit_status};
