//! Stamp the binaries with a release version.
//!
//! Packagers building from a tarball set `GERRIT_VIEW_BUILD_VERSION`.
//! Otherwise the nearest `v*` tag of the checkout is used, and the crate
//! version when there is no git metadata at all.

use std::process::Command;

const OVERRIDE: &str = "GERRIT_VIEW_BUILD_VERSION";

fn main() {
    println!("cargo:rerun-if-env-changed={OVERRIDE}");
    for watched in ["../../.git/HEAD", "../../.git/refs/tags"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    let version = std::env::var(OVERRIDE)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(tag_version)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=GERRIT_VIEW_VERSION={version}");
}

/// `v1.2-3-gabc123-dev` style description of the checkout, without the `v`.
fn tag_version() -> Option<String> {
    let out = Command::new("git")
        .args(["describe", "--tags", "--match", "v*", "--dirty=-dev"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let described = String::from_utf8(out.stdout).ok()?;
    let described = described.trim();
    let version = described.strip_prefix('v').unwrap_or(described);
    (!version.is_empty()).then(|| version.to_string())
}
