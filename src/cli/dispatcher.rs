//! Command dispatcher
//!
//! Routes a script name to its command. `build` spawns this binary again for
//! each of its steps; the hidden step commands run in-process.

use crate::bundler::BuildMode;
use crate::cli::args::{Cli, Command, DeployArg};
use crate::commands::{self, Context};
use crate::error::Result;
use crate::pipeline::{ChildProcessRunner, DeployMode};
use crate::project_identity;
use crate::ui as output;

/// Scripts listed when an unknown one is requested
pub const SCRIPTS: &[&str] = &[
    "build",
    "create-addon",
    "deploy",
    "deploy-prod",
    "dev",
    "sign",
    "zip",
    "setup-dev-properties",
    "test",
];

pub fn dispatch(args: &Cli) -> Result<()> {
    let command = match &args.command {
        Some(Command::External(raw)) => {
            unknown_script(raw.first().map(String::as_str));
            return Ok(());
        }
        Some(command) => command,
        None => {
            unknown_script(None);
            return Ok(());
        }
    };

    let ctx = Context::from_process(args.global.forwarded())?;
    run_command(&ctx, command)
}

/// Run `command` inside `ctx`.
pub fn run_command(ctx: &Context, command: &Command) -> Result<()> {
    match command {
        Command::Build { deploy } => {
            let mut runner = ChildProcessRunner::current(&ctx.root, ctx.forwarded.clone())?;
            commands::build::run(ctx, deploy.map(|d| d.mode()), &mut runner)
        }
        Command::CreateAddon => commands::create_addon::run(ctx),
        Command::Deploy { mode } => commands::deploy::run_dev(ctx, deploy_mode(*mode)),
        Command::DeployProd { activate } => commands::deploy::run_production(ctx, *activate),
        Command::Dev => commands::dev::run(ctx),
        Command::Sign => {
            commands::sign::run(ctx, &commands::sign::SigningService::default()).map(|_| ())
        }
        Command::Zip => commands::zip::run(ctx).map(|_| ()),
        Command::SetupDevProperties => commands::setup::run(ctx),
        Command::Test { args } => commands::test::run(ctx, args),
        Command::Bundle { dev } => {
            let mode = if *dev {
                BuildMode::Development
            } else {
                BuildMode::Production
            };
            commands::build::run_bundle(ctx, mode)
        }
        Command::Transpile => commands::build::run_transpile(ctx),
        Command::Copy => commands::build::run_copy(ctx),
        Command::Cleanup => commands::build::run_cleanup(ctx),
        Command::External(raw) => {
            unknown_script(raw.first().map(String::as_str));
            Ok(())
        }
    }
}

pub fn deploy_mode(arg: Option<DeployArg>) -> DeployMode {
    match arg {
        Some(DeployArg::Force) => DeployMode::Force,
        None => DeployMode::Normal,
    }
}

/// Unknown scripts are not an error: warn, list what exists, exit 0.
fn unknown_script(name: Option<&str>) {
    match name {
        Some(name) => output::warning(&format!("Unknown script \"{}\".", name)),
        None => output::warning("No script given."),
    }
    output::info(&format!(
        "Perhaps you need to update {}? Available scripts: {}",
        project_identity::BINARY_NAME,
        SCRIPTS.join(", ")
    ));
}
