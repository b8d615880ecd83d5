pub mod bundler;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod project_identity;
pub mod remote;
pub mod ui;
pub mod utils;

use clap::Parser;
use error::ScriptsError;
use std::process::exit;

/// Run sitevision-scripts CLI entrypoint.
pub fn run_cli() {
    // Colors first, everything after may print
    ui::init_colors();

    // Only `dev` installs a Ctrl+C handler; every other script simply dies
    // with its children.
    let args = cli::args::Cli::parse();
    ui::set_quiet(args.global.quiet);
    ui::set_verbose(args.global.verbose);

    if let Err(e) = cli::dispatcher::dispatch(&args) {
        match &e {
            ScriptsError::Interrupted => ui::warning("Operation cancelled by user."),
            // The child already printed why it failed
            ScriptsError::StepFailed { .. } if !ui::is_verbose() => {}
            _ => ui::error(&format!("{}", e)),
        }
        exit(e.exit_code());
    }
}
