use super::{Step, StepRunner};
use crate::error::{Result, ScriptsError};
use crate::utils::platform::{build_program_command, display_command};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

#[cfg(unix)]
const SIGKILL: i32 = 9;
#[cfg(unix)]
const SIGTERM: i32 = 15;

/// Spawns this binary once per step.
pub struct ChildProcessRunner {
    exe: PathBuf,
    cwd: PathBuf,
    /// Flags forwarded to every child (`--verbose`, `--quiet`)
    forwarded: Vec<String>,
}

impl ChildProcessRunner {
    pub fn new(exe: &Path, cwd: &Path, forwarded: Vec<String>) -> Self {
        Self {
            exe: exe.to_path_buf(),
            cwd: cwd.to_path_buf(),
            forwarded,
        }
    }

    /// Runner that re-invokes the currently running executable
    pub fn current(cwd: &Path, forwarded: Vec<String>) -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| ScriptsError::Other(format!("Unable to locate current executable: {}", e)))?;
        Ok(Self::new(&exe, cwd, forwarded))
    }
}

impl StepRunner for ChildProcessRunner {
    fn run(&mut self, step: &Step) -> Result<()> {
        let mut args = self.forwarded.clone();
        args.extend(step.args());
        let mut cmd = build_program_command(&self.exe.to_string_lossy(), &args, &self.cwd);

        let status = cmd.status().map_err(|e| ScriptsError::SystemCommandFailed {
            command: display_command(&cmd),
            reason: e.to_string(),
        })?;
        check_status(step.name(), status)
    }
}

/// Outcome of a finished child process named `step`
pub fn check_status(step: &str, status: ExitStatus) -> Result<()> {
    #[cfg(unix)]
    let signal = std::os::unix::process::ExitStatusExt::signal(&status);
    #[cfg(not(unix))]
    let signal: Option<i32> = None;

    classify_exit(step, status.code(), signal)
}

/// Map a child's exit code / terminating signal to the step outcome.
pub fn classify_exit(step: &str, code: Option<i32>, signal: Option<i32>) -> Result<()> {
    if let Some(signal) = signal {
        return Err(killed(step, signal));
    }
    match code {
        Some(0) => Ok(()),
        Some(code) => Err(ScriptsError::StepFailed {
            step: step.to_string(),
            code,
        }),
        None => Err(ScriptsError::StepFailed {
            step: step.to_string(),
            code: 1,
        }),
    }
}

#[cfg(unix)]
fn killed(step: &str, signal: i32) -> ScriptsError {
    let (name, hint) = match signal {
        SIGKILL => (
            "SIGKILL".to_string(),
            "The process was killed, most likely because the system ran out of memory.",
        ),
        SIGTERM => (
            "SIGTERM".to_string(),
            "The process was terminated by another process or by the system.",
        ),
        other => (format!("signal {}", other), "The process did not finish."),
    };
    ScriptsError::StepKilled {
        step: step.to_string(),
        signal: name,
        hint: hint.to_string(),
    }
}

#[cfg(not(unix))]
fn killed(step: &str, signal: i32) -> ScriptsError {
    ScriptsError::StepKilled {
        step: step.to_string(),
        signal: format!("signal {}", signal),
        hint: "The process did not finish.".to_string(),
    }
}
