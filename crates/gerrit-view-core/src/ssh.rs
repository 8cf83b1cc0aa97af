//! SSH command construction for the Gerrit command-line interface.
//!
//! Gerrit exposes `stream-events` and `query` over its SSH daemon; both
//! clients shell out to the system `ssh` binary rather than embedding an
//! SSH implementation, so the user's agent and `known_hosts` apply.

use crate::config::Settings;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Where and how to reach a Gerrit SSH daemon.
#[derive(Debug, Clone)]
pub struct SshTarget {
    program: OsString,
    server: String,
    port: u16,
    username: String,
    keyfile: Option<PathBuf>,
}

impl SshTarget {
    /// Target for resolved settings, using the `ssh` client.
    pub fn new(settings: &Settings) -> Self {
        Self {
            program: OsString::from("ssh"),
            server: settings.server.clone(),
            port: settings.port,
            username: settings.username.clone(),
            keyfile: settings.keyfile.clone(),
        }
    }

    /// Use a different client binary instead of `ssh`.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Gerrit host name.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Gerrit SSH port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Locate the client binary on `PATH`.
    ///
    /// # Errors
    ///
    /// Fails if the program cannot be found or is not executable.
    pub fn locate(&self) -> Result<PathBuf, which::Error> {
        which::which(&self.program)
    }

    /// Arguments passed to the client, excluding the program itself.
    pub fn args(&self, remote: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-x".into(),
            "-p".into(),
            self.port.to_string().into(),
            "-o".into(),
            "BatchMode=yes".into(),
        ];
        if let Some(key) = &self.keyfile {
            args.push("-i".into());
            args.push(key.clone().into_os_string());
        }
        args.push(format!("{}@{}", self.username, self.server).into());
        args.push("gerrit".into());
        args.extend(remote.iter().map(OsString::from));
        args
    }

    /// Build a command running `gerrit <remote...>` on the server, with
    /// stdout and stderr piped. The child is killed when dropped.
    pub fn command(&self, remote: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(remote))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}
