//! Step sequencing.
//!
//! Composite commands run each step as its own child process of this binary
//! and stop at the first step that does not exit cleanly.

mod process;

pub use process::{ChildProcessRunner, check_status, classify_exit};

use crate::error::Result;
use crate::ui as output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    Normal,
    Force,
}

/// One unit of work a composite command can spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Bundled app: webpack build into `build/`
    Bundle,
    /// Legacy app: babel `src/`, copy `static/`
    Transpile,
    /// Legacy app: copy `static/` and `src/` verbatim
    Copy,
    Zip,
    Deploy(DeployMode),
    Cleanup,
    /// The whole `build [deploy|force-deploy]` composite
    Build(Option<DeployMode>),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Bundle => "bundle",
            Step::Transpile => "transpile",
            Step::Copy => "copy",
            Step::Zip => "zip",
            Step::Deploy(DeployMode::Normal) => "deploy",
            Step::Deploy(DeployMode::Force) => "force-deploy",
            Step::Cleanup => "cleanup",
            Step::Build(_) => "build",
        }
    }

    /// Arguments that make this binary run exactly this step
    pub fn args(&self) -> Vec<String> {
        let args: &[&str] = match self {
            Step::Bundle => &["bundle"],
            Step::Transpile => &["transpile"],
            Step::Copy => &["copy"],
            Step::Zip => &["zip"],
            Step::Deploy(DeployMode::Normal) => &["deploy"],
            Step::Deploy(DeployMode::Force) => &["deploy", "force"],
            Step::Cleanup => &["cleanup"],
            Step::Build(None) => &["build"],
            Step::Build(Some(DeployMode::Normal)) => &["build", "deploy"],
            Step::Build(Some(DeployMode::Force)) => &["build", "force-deploy"],
        };
        args.iter().map(|a| a.to_string()).collect()
    }
}

/// Runs a single step to completion.
///
/// A step that exits non-zero or dies from a signal is an `Err`
/// (`StepFailed` / `StepKilled`).
pub trait StepRunner {
    fn run(&mut self, step: &Step) -> Result<()>;
}

/// Choose how the build directory gets populated. `bundled` decides alone;
/// `transpile` only matters for non-bundled apps.
pub fn populate_step(bundled: bool, transpile: bool) -> Step {
    if bundled {
        Step::Bundle
    } else if transpile {
        Step::Transpile
    } else {
        Step::Copy
    }
}

/// Steps of `build [deploy|force-deploy]`, in order.
pub fn build_plan(bundled: bool, transpile: bool, deploy: Option<DeployMode>) -> Vec<Step> {
    let mut steps = vec![populate_step(bundled, transpile), Step::Zip];
    if let Some(mode) = deploy {
        steps.push(Step::Deploy(mode));
    }
    steps.push(Step::Cleanup);
    steps
}

/// Run `steps` in order, stopping at the first failure.
pub fn run_sequence<R: StepRunner + ?Sized>(runner: &mut R, steps: &[Step]) -> Result<()> {
    for step in steps {
        output::verbose(&format!("Step: {}", step.name()));
        runner.run(step)?;
    }
    Ok(())
}
