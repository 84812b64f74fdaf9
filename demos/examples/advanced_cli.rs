// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small user-management CLI built from independently declared components.
//!
//! Each command names its parent; the order of registration does not matter. Pass
//! `--children-first` to register every command before the root and watch the tree
//! come out the same.
//!
//! Run:
//! - `cargo run -p arbor_demos --example advanced_cli`
//! - `cargo run -p arbor_demos --example advanced_cli -- users list`
//! - `cargo run -p arbor_demos --example advanced_cli -- users add ada`
//! - `RUST_LOG=debug cargo run -p arbor_demos --example advanced_cli -- --children-first users`

use std::cell::RefCell;
use std::process::ExitCode;

use anyhow::Context as _;
use arbor_dispatch::{DispatchError, Dispatcher, exit_code};
use arbor_tree::{
    BEFORE_RUN, ComponentDesc, ComponentId, Handler, Phase, Registry, Value, handler_fn, listener,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "advanced", about = "An advanced CLI application with modules")]
struct Cli {
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    log: String,

    /// Register every command before the root component.
    #[arg(long)]
    children_first: bool,

    /// Command path followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

/// In-memory user list shared by the `users` commands.
struct UserStore {
    users: RefCell<Vec<String>>,
}

impl Handler for UserStore {}

fn descriptions() -> Vec<ComponentDesc> {
    vec![
        ComponentDesc::root("advanced")
            .version("1.0.0")
            .description("An advanced CLI application with modules")
            .child(
                ComponentDesc::module("version")
                    .description("Show the application version")
                    .handler(handler_fn(|cx, _args: &[String]| {
                        let registry = cx.registry();
                        let version = cx
                            .component()
                            .and_then(|c| c.parent())
                            .and_then(|root| registry.component(root))
                            .and_then(|root| root.version())
                            .unwrap_or("unknown");
                        Ok(Value::from(version))
                    })),
            ),
        ComponentDesc::module("users")
            .description("User management commands")
            .parent("advanced")
            .handler(handler_fn(|cx, _args: &[String]| {
                println!("Available user commands:");
                let registry = cx.registry();
                for id in registry.children(cx.id()) {
                    let Some(child) = registry.component(id) else {
                        continue;
                    };
                    if child.is_executable() {
                        println!(
                            "  {}: {}",
                            child.name(),
                            child.description().unwrap_or("No description")
                        );
                    }
                }
                Ok(Value::Null)
            })),
        ComponentDesc::library("store")
            .description("User storage")
            .parent("users")
            .handler(UserStore {
                users: RefCell::new(vec!["admin".into(), "user1".into(), "user2".into()]),
            }),
        ComponentDesc::module("list")
            .description("List all users")
            .parent("users")
            .handler(handler_fn(|cx, _args: &[String]| {
                let store = cx.library::<UserStore>("store").ok_or("user store missing")?;
                println!("Listing all users:");
                for user in store.users.borrow().iter() {
                    println!("  - {user}");
                }
                Ok(Value::Null)
            })),
        ComponentDesc::module("add")
            .description("Add a new user")
            .parent("users")
            .handler(handler_fn(|cx, args: &[String]| {
                let username = args.first().ok_or("username is required")?;
                let store = cx.library::<UserStore>("store").ok_or("user store missing")?;
                store.users.borrow_mut().push(username.clone());
                cx.emit("user:added", &[Value::from(username.as_str())])?;
                Ok(Value::from(format!("Added user: {username}")))
            })),
        ComponentDesc::module("tools")
            .parent("advanced")
            .executable(false),
    ]
}

fn build(registry: &mut Registry, children_first: bool) -> anyhow::Result<ComponentId> {
    let mut descs = descriptions();
    if children_first {
        descs.reverse();
    }
    for desc in descs {
        registry.register(desc)?;
    }
    let app = registry
        .get("advanced")
        .context("root component was not registered")?;

    let root = registry.component(app).context("root component is stale")?;
    let banner = format!(
        "Setting up {} v{}...",
        root.name(),
        root.version().unwrap_or("unknown")
    );
    registry.once(
        app,
        BEFORE_RUN,
        listener(move |_: &[Value]| {
            tracing::info!("{banner}");
            Ok(())
        }),
        Phase::Pre,
    )?;
    registry.on(
        app,
        "user:added",
        listener(|args: &[Value]| {
            tracing::info!(user = %args.first().cloned().unwrap_or_default(), "user added");
            Ok(())
        }),
        Phase::Post,
    )?;

    if !registry.orphans().is_empty() {
        tracing::warn!(orphans = registry.orphans().len(), "some components have no parent");
    }
    Ok(app)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)),
        )
        .init();

    let mut registry = Registry::new();
    let app = build(&mut registry, cli.children_first)?;

    let result = Dispatcher::new(&mut registry, app).dispatch(&cli.tokens);
    let code = exit_code(&result);
    match result {
        Ok(Value::Null) | Err(DispatchError::NoCommand) => {}
        Ok(value) => println!("{value}"),
        Err(err) => eprintln!("error: {:#}", anyhow::Error::new(err)),
    }
    Ok(code)
}
