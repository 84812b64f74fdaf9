// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Token routing through a component tree.

use std::fmt;
use std::io::{self, Write};

use arbor_tree::{ComponentId, Kind, Registry, Value};

use crate::error::DispatchError;
use crate::usage;

/// Routes command-line tokens to a component and runs it.
///
/// ## Routing
///
/// - No tokens: the usage summary of the root is written to the output and
///   [`DispatchError::NoCommand`] is returned.
/// - The first token must name a child of the root.
/// - Routing descends while the next token names a child of the current component.
/// - Leftover tokens become the arguments of the component reached, if it has no children or is
///   an executable module. Otherwise the first leftover token is an unknown subcommand.
///
/// ```
/// use arbor_dispatch::Dispatcher;
/// use arbor_tree::{ComponentDesc, Registry, Value, handler_fn};
///
/// let mut registry = Registry::new();
/// let app = registry.register(ComponentDesc::root("app")).unwrap();
/// registry
///     .register(ComponentDesc::module("echo").parent("app").handler(handler_fn(
///         |_cx, args: &[String]| Ok(Value::from(args.join(" "))),
///     )))
///     .unwrap();
///
/// let mut out = Vec::new();
/// let mut dispatcher = Dispatcher::new(&mut registry, app).with_output(&mut out);
/// let tokens = ["echo", "hello", "world"].map(String::from);
/// assert_eq!(dispatcher.dispatch(&tokens).unwrap(), Value::from("hello world"));
/// ```
pub struct Dispatcher<'r, W = io::Stdout> {
    registry: &'r mut Registry,
    root: ComponentId,
    out: W,
}

impl<W> fmt::Debug for Dispatcher<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<'r> Dispatcher<'r> {
    /// Create a dispatcher for the tree under `root`, writing to stdout.
    pub fn new(registry: &'r mut Registry, root: ComponentId) -> Self {
        Self {
            registry,
            root,
            out: io::stdout(),
        }
    }
}

impl<'r, W: Write> Dispatcher<'r, W> {
    /// Replace the output sink used for the usage summary.
    pub fn with_output<W2: Write>(self, out: W2) -> Dispatcher<'r, W2> {
        Dispatcher {
            registry: self.registry,
            root: self.root,
            out,
        }
    }

    /// Usage summary of the root.
    pub fn usage(&self) -> String {
        usage::render(self.registry, self.root)
    }

    /// Route `tokens` and run the component they name.
    pub fn dispatch(&mut self, tokens: &[String]) -> Result<Value, DispatchError> {
        let (target, args) = self.route(tokens)?;
        tracing::debug!(?target, args = args.len(), "dispatching");
        Ok(self.registry.run(target, args)?)
    }

    /// Find the component `tokens` lead to and the leftover arguments.
    fn route<'t>(
        &mut self,
        tokens: &'t [String],
    ) -> Result<(ComponentId, &'t [String]), DispatchError> {
        let Some((first, _)) = tokens.split_first() else {
            let text = self.usage();
            self.out.write_all(text.as_bytes())?;
            self.out.flush()?;
            return Err(DispatchError::NoCommand);
        };
        if self.registry.child(self.root, first).is_none() {
            return Err(self.unknown(self.root, first));
        }

        let mut current = self.root;
        let mut rest = tokens;
        while let Some((token, tail)) = rest.split_first() {
            let Some(child) = self.registry.child(current, token) else {
                break;
            };
            tracing::debug!(%token, "descending");
            current = child;
            rest = tail;
        }

        if let Some(token) = rest.first() {
            let accepts_args = self.registry.component(current).is_some_and(|c| {
                c.children().next().is_none() || matches!(c.kind(), Kind::Module { executable: true })
            });
            if !accepts_args {
                return Err(self.unknown(current, token));
            }
        }
        Ok((current, rest))
    }

    fn unknown(&self, parent: ComponentId, token: &str) -> DispatchError {
        let parent = self
            .registry
            .component(parent)
            .map(|c| c.name().to_owned())
            .unwrap_or_default();
        DispatchError::UnknownCommand {
            token: token.to_owned(),
            parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_status;
    use arbor_tree::{ComponentDesc, Error, handler_fn};

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    fn echo() -> impl arbor_tree::Handler {
        handler_fn(|cx, args: &[String]| {
            let name = cx.component().map(|c| c.name().to_owned()).unwrap_or_default();
            Ok(Value::from(format!("{name}({})", args.join(","))))
        })
    }

    /// `app` with `users` (non-executable group: `list`, `add`) and `version`.
    fn app(registry: &mut Registry) -> ComponentId {
        registry
            .register(ComponentDesc::module("add").parent("users").handler(echo()))
            .unwrap();
        registry
            .register(ComponentDesc::module("list").parent("users").handler(echo()))
            .unwrap();
        registry
            .register(
                ComponentDesc::module("users")
                    .parent("app")
                    .executable(false),
            )
            .unwrap();
        registry
            .register(ComponentDesc::module("version").parent("app").handler(echo()))
            .unwrap();
        registry
            .register(ComponentDesc::root("app").description("Demo"))
            .unwrap()
    }

    #[test]
    fn no_tokens_writes_usage() {
        let mut registry = Registry::new();
        let root = app(&mut registry);
        let mut out = Vec::new();
        let result = Dispatcher::new(&mut registry, root)
            .with_output(&mut out)
            .dispatch(&[]);

        assert!(matches!(result, Err(DispatchError::NoCommand)));
        assert_eq!(exit_status(&result), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("app v0.1.0\nDescription: Demo\n"));
        assert!(text.contains("  users: No description\n"));
    }

    #[test]
    fn unknown_top_level_command() {
        let mut registry = Registry::new();
        let root = app(&mut registry);
        let mut dispatcher = Dispatcher::new(&mut registry, root).with_output(Vec::new());
        let err = dispatcher.dispatch(&tokens(&["nope"])).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnknownCommand { ref token, ref parent } if token == "nope" && parent == "app"
        ));
    }

    #[test]
    fn unknown_subcommand_of_a_group() {
        let mut registry = Registry::new();
        let root = app(&mut registry);
        let mut dispatcher = Dispatcher::new(&mut registry, root).with_output(Vec::new());
        let err = dispatcher
            .dispatch(&tokens(&["users", "remove", "bob"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnknownCommand { ref token, ref parent } if token == "remove" && parent == "users"
        ));
    }

    #[test]
    fn leaf_receives_remaining_tokens() {
        let mut registry = Registry::new();
        let root = app(&mut registry);
        let mut dispatcher = Dispatcher::new(&mut registry, root).with_output(Vec::new());

        let out = dispatcher
            .dispatch(&tokens(&["users", "add", "ada", "lovelace"]))
            .unwrap();
        assert_eq!(out, Value::from("add(ada,lovelace)"));
        let out = dispatcher.dispatch(&tokens(&["version"])).unwrap();
        assert_eq!(out, Value::from("version()"));
    }

    #[test]
    fn executable_group_takes_arguments() {
        let mut registry = Registry::new();
        let root = registry.register(ComponentDesc::root("app")).unwrap();
        registry
            .register(ComponentDesc::module("git").parent("app").handler(echo()))
            .unwrap();
        registry
            .register(ComponentDesc::module("log").parent("git").handler(echo()))
            .unwrap();
        let mut dispatcher = Dispatcher::new(&mut registry, root).with_output(Vec::new());

        assert_eq!(
            dispatcher.dispatch(&tokens(&["git", "status"])).unwrap(),
            Value::from("git(status)")
        );
        assert_eq!(
            dispatcher.dispatch(&tokens(&["git", "log", "-1"])).unwrap(),
            Value::from("log(-1)")
        );
    }

    #[test]
    fn group_without_arguments_runs_as_no_op() {
        let mut registry = Registry::new();
        let root = app(&mut registry);
        let mut dispatcher = Dispatcher::new(&mut registry, root).with_output(Vec::new());
        assert_eq!(dispatcher.dispatch(&tokens(&["users"])).unwrap(), Value::Null);
    }

    #[test]
    fn handler_errors_propagate() {
        let mut registry = Registry::new();
        let root = registry.register(ComponentDesc::root("app")).unwrap();
        registry
            .register(
                ComponentDesc::module("fail")
                    .parent("app")
                    .handler(handler_fn(|_cx, _args: &[String]| Err("nope".into()))),
            )
            .unwrap();
        let result = Dispatcher::new(&mut registry, root)
            .with_output(Vec::new())
            .dispatch(&tokens(&["fail"]));
        assert!(matches!(
            result,
            Err(DispatchError::Tree(Error::Handler { .. }))
        ));
        assert_eq!(exit_status(&result), 1);
    }

    #[test]
    fn stale_root_is_reported() {
        let mut registry = Registry::new();
        let root = app(&mut registry);
        registry.clear();
        let mut dispatcher = Dispatcher::new(&mut registry, root).with_output(Vec::new());
        assert_eq!(dispatcher.usage(), "");
        assert!(matches!(
            dispatcher.dispatch(&tokens(&["users"])),
            Err(DispatchError::UnknownCommand { .. })
        ));
    }
}
