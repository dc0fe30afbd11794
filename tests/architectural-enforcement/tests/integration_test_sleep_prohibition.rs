//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Typewriter ticks
//! and reconnects are entries in the panel's timer queue; the run loop waits
//! on the earliest deadline with `sleep_until`, on I/O, or on the frame
//! interval.
//! **Exceptions**: test code (`#[cfg(test)]` modules)

use architectural_enforcement::{
    code_part, rust_sources, test_module_start, workspace_root, PRODUCTION_DIRS,
};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  {violation}");
        }

        eprintln!("\nACCEPTABLE:");
        eprintln!("  - tokio::time::sleep_until(<next timer deadline>)");
        eprintln!("  - tokio::time::interval() for the frame cadence");
        eprintln!("  - Test code");
        eprintln!("\nFORBIDDEN:");
        eprintln!("  - std::thread::sleep anywhere");
        eprintln!("  - tokio::time::sleep as a delay instead of a scheduled task");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
    let root = workspace_root();
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        for (path, content) in rust_sources(&root.join(dir)) {
            violations.extend(
                sleep_calls(&content)
                    .into_iter()
                    .map(|(line_number, line)| format!("{}:{} - {}", path.display(), line_number, line)),
            );
        }
    }

    violations
}

/// `(line number, trimmed line)` of every sleep call outside test code
fn sleep_calls(content: &str) -> Vec<(usize, String)> {
    let lines: Vec<&str> = content.lines().collect();
    let end = test_module_start(&lines).unwrap_or(lines.len());

    lines[..end]
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let code = code_part(line);
            code.contains("::sleep(") || code.contains(".sleep(") || code.trim_start().starts_with("sleep(")
        })
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .collect()
}

#[test]
fn test_sleep_detection() {
    let code = "fn bad() {\n    std::thread::sleep(Duration::from_millis(30));\n}\n";
    assert_eq!(sleep_calls(code).len(), 1);

    let code = "async fn bad() {\n    tokio::time::sleep(delay).await;\n}\n";
    assert_eq!(sleep_calls(code).len(), 1);
}

#[test]
fn test_sleep_until_deadline_is_allowed() {
    let code = "async fn wait(d: Instant) {\n    tokio::time::sleep_until(d.into()).await;\n}\n";
    assert!(sleep_calls(code).is_empty());
}

#[test]
fn test_sleep_in_test_module_is_allowed() {
    let code = "fn ok() {}\n\n#[cfg(test)]\nmod tests {\n    fn t() { std::thread::sleep(d); }\n}\n";
    assert!(sleep_calls(code).is_empty());
}

#[test]
fn test_sleep_in_comment_is_ignored() {
    let code = "fn ok() {\n    // never thread::sleep(d) here\n}\n";
    assert!(sleep_calls(code).is_empty());
}
