//! Integration Test: Core Isolation
//!
//! **Policy**: `panel-core` has no terminal or UI dependencies, and its state
//! machines do not touch an async runtime. Only the `transport` module may
//! use tokio; everything else is driven by the caller's clock.

use std::fs;

use architectural_enforcement::{code_part, rust_sources, test_module_start, workspace_root};

/// Crates the core must never name
const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

/// Test that the core manifest does not depend on UI crates
#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("panel/core/Cargo.toml"))
        .expect("panel/core/Cargo.toml should be readable");

    for krate in UI_CRATES {
        assert!(
            !manifest.lines().any(|line| line.trim_start().starts_with(krate)),
            "panel-core must not depend on {krate}"
        );
    }
}

/// Test that core state machines never reach for tokio
#[test]
fn test_core_state_machines_are_runtime_free() {
    let src = workspace_root().join("panel/core/src");
    let mut violations = Vec::new();

    for (path, content) in rust_sources(&src) {
        if path.components().any(|c| c.as_os_str() == "transport") {
            continue;
        }

        let lines: Vec<&str> = content.lines().collect();
        let end = test_module_start(&lines).unwrap_or(lines.len());
        for (idx, line) in lines[..end].iter().enumerate() {
            let code = code_part(line);
            let mentions_ui = UI_CRATES.iter().any(|k| code.contains(&format!("{k}::")));
            if code.contains("tokio::") || mentions_ui {
                violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Runtime or UI usage outside panel-core's transport module:\n  {}",
        violations.join("\n  ")
    );
}
