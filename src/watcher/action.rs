//! Restart actions invoked when a debounced trigger fires.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context};

/// Something to do when the watched tree has settled after a change.
///
/// Failures are reported back to the watch loop, which logs them and keeps
/// watching.
pub trait RestartAction: Send {
    /// Perform the restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the restart could not be carried out.
    fn restart(&mut self) -> anyhow::Result<()>;
}

impl<F> RestartAction for F
where
    F: FnMut() -> anyhow::Result<()> + Send,
{
    fn restart(&mut self) -> anyhow::Result<()> {
        self()
    }
}

/// Restart a unit through `systemctl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemctlRestart {
    unit: String,
    user: bool,
}

impl SystemctlRestart {
    /// Restart `unit` in the per-user service manager.
    #[must_use]
    pub fn user(unit: &str) -> Self {
        Self {
            unit: service_name(unit),
            user: true,
        }
    }

    /// Restart `unit` in the system service manager.
    #[must_use]
    pub fn system(unit: &str) -> Self {
        Self {
            unit: service_name(unit),
            user: false,
        }
    }

    /// Normalised unit name.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Arguments passed to `systemctl`.
    #[must_use]
    pub fn args(&self) -> Vec<&str> {
        let mut args = Vec::with_capacity(3);
        if self.user {
            args.push("--user");
        }
        args.push("restart");
        args.push(self.unit.as_str());
        args
    }
}

impl RestartAction for SystemctlRestart {
    fn restart(&mut self) -> anyhow::Result<()> {
        let status = Command::new("systemctl")
            .args(self.args())
            .status()
            .with_context(|| format!("failed to run systemctl for {}", self.unit))?;

        if !status.success() {
            bail!("systemctl restart {} exited with {status}", self.unit);
        }
        tracing::info!(unit = %self.unit, "Unit restarted");
        Ok(())
    }
}

/// Run a shell command, optionally in a given directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAction {
    command: String,
    cwd: Option<PathBuf>,
}

impl CommandAction {
    /// Create an action running `command` through `sh -c`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
        }
    }

    /// Run the command from `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl RestartAction for CommandAction {
    fn restart(&mut self) -> anyhow::Result<()> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to spawn `{}`", self.command))?;

        if !status.success() {
            bail!("`{}` exited with {status}", self.command);
        }
        Ok(())
    }
}

/// Append `.service` unless the name already carries a unit suffix.
#[must_use]
pub fn service_name(unit: &str) -> String {
    const SUFFIXES: &[&str] = &[".service", ".timer", ".socket", ".path", ".target"];

    if SUFFIXES.iter().any(|suffix| unit.ends_with(suffix)) {
        unit.to_string()
    } else {
        format!("{unit}.service")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(service_name("app"), "app.service");
        assert_eq!(service_name("app.service"), "app.service");
        assert_eq!(service_name("backup.timer"), "backup.timer");
    }

    #[test]
    fn test_systemctl_args() {
        assert_eq!(
            SystemctlRestart::user("app").args(),
            vec!["--user", "restart", "app.service"]
        );
        assert_eq!(
            SystemctlRestart::system("web.service").args(),
            vec!["restart", "web.service"]
        );
    }

    #[test]
    fn test_closure_action() {
        let mut calls = 0;
        let mut action = || -> anyhow::Result<()> {
            calls += 1;
            Ok(())
        };
        action.restart().unwrap();
        action.restart().unwrap();
        drop(action);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_command_action_success() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut action = CommandAction::new("touch restarted").current_dir(tmp.path());

        action.restart().unwrap();

        assert!(tmp.path().join("restarted").exists());
    }

    #[test]
    fn test_command_action_failure() {
        let mut action = CommandAction::new("exit 3");

        let err = action.restart().unwrap_err();

        assert!(err.to_string().contains("exit 3"));
    }
}
