//! End-to-end tests that run the built binaries.

use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Test context that sets up a temporary gerrit-view home
struct TestContext {
    temp_dir: TempDir,
    home: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let home = temp_dir.path().join(".gerrit-view");
        std::fs::create_dir_all(&home).expect("failed to create gerrit-view home");
        Self { temp_dir, home }
    }

    fn cmd(&self, bin_path: &str) -> Command {
        let mut cmd = Command::new(bin_path);
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("GERRIT_VIEW_HOME", &self.home);
        for var in ["GERRIT_HOST", "GERRIT_PORT", "GERRIT_USER", "GERRIT_KEYFILE", "GERRIT_VIEW_CONFIG"] {
            cmd.env_remove(var);
        }
        cmd
    }

    fn gerrit_view(&self) -> Command {
        self.cmd(env!("CARGO_BIN_EXE_gerrit-view"))
    }

    fn qgerrit(&self) -> Command {
        self.cmd(env!("CARGO_BIN_EXE_qgerrit"))
    }

    fn cgerrit(&self) -> Command {
        self.cmd(env!("CARGO_BIN_EXE_cgerrit"))
    }

    /// A package root with the two files the manifest reads.
    fn package_root(&self, requirements: &str) -> PathBuf {
        let root = self.temp_dir.path().join("pkg");
        std::fs::create_dir_all(&root).expect("failed to create package root");
        std::fs::write(root.join("requirements.txt"), requirements).unwrap();
        std::fs::write(root.join("README.rst"), "gerrit-view\n===========\n").unwrap();
        root
    }
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    for mut cmd in [ctx.gerrit_view(), ctx.qgerrit(), ctx.cgerrit()] {
        let output = cmd.arg("--help").output().expect("failed to run binary");
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Usage:"));
    }
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx
        .qgerrit()
        .arg("--version")
        .output()
        .expect("failed to run qgerrit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("qgerrit "));
}

#[test]
fn test_manifest_json() {
    let ctx = TestContext::new();
    let root = ctx.package_root("# comment\nparamiko>=1.8\n\n  prettytable  \n");
    let output = ctx
        .gerrit_view()
        .args(["manifest", "--root"])
        .arg(&root)
        .output()
        .expect("failed to run gerrit-view");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let manifest: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("manifest should be JSON");
    assert_eq!(manifest["name"], "gerrit-view");
    assert_eq!(
        manifest["install_requires"],
        serde_json::json!(["paramiko>=1.8", "prettytable"])
    );
    assert_eq!(manifest["long_description"], "gerrit-view\n===========\n");
}

#[test]
fn test_manifest_toml() {
    let ctx = TestContext::new();
    let root = ctx.package_root("six\n");
    let output = ctx
        .gerrit_view()
        .args(["manifest", "--format", "toml", "--root"])
        .arg(&root)
        .output()
        .expect("failed to run gerrit-view");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name = \"gerrit-view\""));
}

#[test]
fn test_manifest_missing_requirements_fails() {
    let ctx = TestContext::new();
    let root = ctx.temp_dir.path().join("empty");
    std::fs::create_dir_all(&root).unwrap();
    let output = ctx
        .gerrit_view()
        .args(["manifest", "--root"])
        .arg(&root)
        .output()
        .expect("failed to run gerrit-view");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("requirements.txt"), "{stderr}");
}

#[test]
fn test_manifest_non_utf8_description_fails() {
    let ctx = TestContext::new();
    let root = ctx.package_root("six\n");
    std::fs::write(root.join("README.rst"), b"caf\xe9\n").unwrap();
    let output = ctx
        .gerrit_view()
        .args(["manifest", "--root"])
        .arg(&root)
        .output()
        .expect("failed to run gerrit-view");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not valid UTF-8"), "{stderr}");
}

#[test]
fn test_qgerrit_rejects_bad_config() {
    let ctx = TestContext::new();
    std::fs::write(ctx.home.join("config.toml"), "not_a_key = 1\n").unwrap();
    let output = ctx
        .qgerrit()
        .args(["--user", "jdoe"])
        .output()
        .expect("failed to run qgerrit");
    assert!(!output.status.success());
}

#[test]
fn test_qgerrit_without_ssh_client() {
    let ctx = TestContext::new();
    let empty_path = ctx.temp_dir.path().join("bin");
    std::fs::create_dir_all(&empty_path).unwrap();
    let output = ctx
        .qgerrit()
        .args(["--user", "jdoe"])
        .env("PATH", &empty_path)
        .output()
        .expect("failed to run qgerrit");
    assert!(!output.status.success());
}
