// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Usage summaries.

use std::fmt::Write as _;

use arbor_tree::{ComponentId, Registry};

/// Text shown for children without a description.
pub const NO_DESCRIPTION: &str = "No description";

/// Render the usage summary of component `id`.
///
/// ```text
/// advanced v1.0.0
/// Description: An advanced CLI application
/// Available commands:
///   users: User management commands
///   tools: No description
/// ```
///
/// The version is shown for roots only, the description line only when one is set. Children
/// are listed in attachment order. Stale ids render as an empty string.
pub fn render(registry: &Registry, id: ComponentId) -> String {
    let Some(component) = registry.component(id) else {
        return String::new();
    };
    let mut out = String::new();
    match component.version() {
        Some(version) => {
            let _ = writeln!(out, "{} v{}", component.name(), version);
        }
        None => {
            let _ = writeln!(out, "{}", component.name());
        }
    }
    if let Some(description) = component.description() {
        let _ = writeln!(out, "Description: {description}");
    }
    out.push_str("Available commands:\n");
    for child in component.children() {
        let Some(child) = registry.component(child) else {
            continue;
        };
        let _ = writeln!(
            out,
            "  {}: {}",
            child.name(),
            child.description().unwrap_or(NO_DESCRIPTION)
        );
    }
    out
}
