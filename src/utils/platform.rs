use crate::error::{Result, ScriptsError};
use std::path::Path;
use std::process::Command;

/// npm's package runner; `npx.cmd` is the launcher on Windows.
#[cfg(windows)]
pub const NPX: &str = "npx.cmd";
#[cfg(not(windows))]
pub const NPX: &str = "npx";

/// Build a direct program invocation rooted at `cwd`.
pub fn build_program_command(program: &str, args: &[String], cwd: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(cwd);
    cmd
}

/// Run an npm-installed tool (`webpack`, `babel`, `jest`) through npx.
///
/// `--no-install` keeps npx from silently downloading a tool that is
/// missing from the project's devDependencies.
pub fn npx_command(tool: &str, args: &[String], cwd: &Path) -> Result<Command> {
    ensure_program(NPX)?;
    let mut full_args = vec!["--no-install".to_string(), tool.to_string()];
    full_args.extend(args.iter().cloned());
    Ok(build_program_command(NPX, &full_args, cwd))
}

pub fn ensure_program(program: &str) -> Result<()> {
    if which::which(program).is_ok() {
        return Ok(());
    }
    Err(ScriptsError::DependencyMissing(format!(
        "'{}' was not found in PATH. Install Node.js and npm.",
        program
    )))
}

/// Human readable rendering of a command for logs
pub fn display_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}
