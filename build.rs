//! Embeds a human-readable version string as `BUILD_INFO_HUMAN`.
//!
//! The string is `<crate version> (<git version>) <rustc version>`, where the
//! git version is `git describe --tags --dirty` when a tag is reachable and
//! `v<crate version>-<timestamp>-<short sha>[+dirty]` otherwise. Parts that
//! cannot be determined are left out.

use std::process::Command;

use chrono::{DateTime, Utc};

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let version = env!("CARGO_PKG_VERSION");
    let parts: Vec<String> = [
        Some(version.to_string()),
        Some(format!("({})", git_version(version))),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect();

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", parts.join(" "));
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn git(args: &[&str]) -> Option<String> {
    run("git", args)
}

/// None when git is unavailable or this is not a checkout.
fn is_dirty() -> Option<bool> {
    let status = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;

    // `cargo install --git` drops .cargo-ok into the checkout.
    Some(
        String::from_utf8_lossy(&status.stdout)
            .lines()
            .filter_map(|line| line.get(3..))
            .any(|path| path != ".cargo-ok"),
    )
}

fn git_version(version: &str) -> String {
    match git(&["describe", "--tags", "--always", "--dirty"]) {
        Some(described) if described.contains('v') || described.contains("-g") => described,
        _ => pseudo_version(version),
    }
}

fn pseudo_version(version: &str) -> String {
    let commit = git(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let dirty = is_dirty();

    let stamp = match dirty {
        Some(false) => git(&["log", "-1", "--format=%ct"])
            .and_then(|secs| secs.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now),
        _ => Utc::now(),
    };

    let suffix = if dirty == Some(true) { "+dirty" } else { "" };
    format!(
        "v{version}-{}-{commit}{suffix}",
        stamp.format("%Y%m%d%H%M%S")
    )
}
