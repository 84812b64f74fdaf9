// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch errors and process exit codes.

use std::io;
use std::process::ExitCode;

/// Errors from [`Dispatcher::dispatch`](crate::Dispatcher::dispatch).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No tokens were given. The usage summary has been written to the output.
    #[error("no command given")]
    NoCommand,
    /// A token did not name a child of the component reached so far.
    #[error("unknown command `{token}` for `{parent}`")]
    UnknownCommand {
        /// The offending token.
        token: String,
        /// Name of the component whose children were searched.
        parent: String,
    },
    /// Running the component failed.
    #[error(transparent)]
    Tree(#[from] arbor_tree::Error),
    /// Writing to the output failed.
    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// Process exit status for a dispatch result: 0 on success, 1 on any error.
pub fn exit_status<T>(result: &Result<T, DispatchError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// [`exit_status`] as an [`ExitCode`], ready to return from `main`.
pub fn exit_code<T>(result: &Result<T, DispatchError>) -> ExitCode {
    ExitCode::from(exit_status(result))
}
