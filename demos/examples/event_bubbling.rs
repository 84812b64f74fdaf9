// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event bubbling basics.
//!
//! Builds `app <- m1 <- m2`, attaches listeners on every level, and emits from the leaf.
//! Each component runs its pre listeners, then its post listeners, before the event moves
//! to its parent. Nothing reaches descendants.
//!
//! Run:
//! - `cargo run -p arbor_demos --example event_bubbling`

use arbor_tree::{AFTER_RUN, ComponentDesc, Phase, Registry, Value, handler_fn, listener};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = Registry::new();
    registry.on_registered(listener(|args: &[Value]| {
        println!("registered {}", args[0]);
        Ok(())
    }));

    // Leaf first: m2 and m1 wait for their parents.
    let m2 = registry.register(
        ComponentDesc::module("m2")
            .parent("m1")
            .handler(handler_fn(|cx, _args: &[String]| {
                cx.emit("test:event", &[Value::from("m2"), Value::from("data")])?;
                Ok(Value::from("done"))
            })),
    )?;
    let m1 = registry.register(ComponentDesc::module("m1").parent("app"))?;
    let app = registry.register(ComponentDesc::root("app"))?;
    println!("path: {:?}", registry.path(m2));

    for (id, name) in [(app, "app"), (m1, "m1"), (m2, "m2")] {
        registry.on(
            id,
            "test:event",
            listener(move |args: &[Value]| {
                println!("  {name} post {}", Value::from(args.to_vec()));
                Ok(())
            }),
            Phase::Post,
        )?;
        registry.on(
            id,
            "test:event",
            listener(move |_: &[Value]| {
                println!("  {name} pre");
                Ok(())
            }),
            Phase::Pre,
        )?;
    }
    registry.once(
        app,
        AFTER_RUN,
        listener(|args: &[Value]| {
            println!("after:run seen at app, result = {}", args[1]);
            Ok(())
        }),
        Phase::Post,
    )?;

    println!("== emit from m2 ==");
    registry.run(m2, &[])?;
    println!("== again (the once listener is gone) ==");
    registry.run(m2, &[])?;
    println!("== emit from app (no downward delivery) ==");
    registry.emit(app, "test:event", &[Value::from("app")])?;
    Ok(())
}
