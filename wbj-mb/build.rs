//! Build script for wbj-mb
//!
//! Composes `WBJ_BUILD_ID`, logged at startup and reported by `/health`:
//! `<version> (<git describe>, <profile>, built <UTC minute>)`.
//! A `+` after the revision marks a dirty work tree.

use std::process::Command;

fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let revision =
        git(&["describe", "--always", "--dirty=+"]).unwrap_or_else(|| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let built = chrono::Utc::now().format("%Y-%m-%dT%H:%MZ");

    println!(
        "cargo:rustc-env=WBJ_BUILD_ID={} ({}, {}, built {})",
        version, revision, profile, built
    );

    if let Some(git_dir) = git(&["rev-parse", "--absolute-git-dir"]) {
        println!("cargo:rerun-if-changed={}/HEAD", git_dir);
        println!("cargo:rerun-if-changed={}/index", git_dir);
    }
    println!("cargo:rerun-if-changed=build.rs");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
