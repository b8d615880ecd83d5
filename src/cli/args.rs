use crate::pipeline::DeployMode;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "sitevision-scripts",
    about = "Build, zip, sign and deploy Sitevision add-ons",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags go before the script name so that `test` can pass its own
/// `--verbose` on to jest.
#[derive(Parser, Debug, Default)]
pub struct GlobalFlags {
    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the add-on into dist/, optionally deploying it
    Build {
        /// Deploy to the development site after zipping
        #[arg(value_enum)]
        deploy: Option<BuildDeploy>,
    },

    /// Create the add-on on the development site
    CreateAddon,

    /// Deploy dist/{id}.zip to the development site
    Deploy {
        /// Overwrite an existing add-on version
        #[arg(value_enum)]
        mode: Option<DeployArg>,
    },

    /// Deploy the signed zip to a production site over HTTPS
    DeployProd {
        /// Activate the deployed executable
        #[arg(short = 'a', long)]
        activate: bool,
    },

    /// Rebuild and force-deploy on every change
    Dev,

    /// Sign dist/{id}.zip with the signing service
    Sign,

    /// Zip the build directory into dist/
    Zip,

    /// Store development site connection info in .dev_properties.json
    SetupDevProperties,

    /// Run jest
    Test {
        /// Arguments passed to jest as is
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Bundle with webpack (build step)
    #[command(hide = true)]
    Bundle {
        /// Development mode
        #[arg(long)]
        dev: bool,
    },

    /// Transpile src/ with babel (build step)
    #[command(hide = true)]
    Transpile,

    /// Copy static/ and src/ into build/ (build step)
    #[command(hide = true)]
    Copy,

    /// Remove build/ (build step)
    #[command(hide = true)]
    Cleanup,

    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildDeploy {
    Deploy,
    ForceDeploy,
}

impl BuildDeploy {
    pub fn mode(self) -> DeployMode {
        match self {
            BuildDeploy::Deploy => DeployMode::Normal,
            BuildDeploy::ForceDeploy => DeployMode::Force,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployArg {
    #[value(alias = "force-deploy")]
    Force,
}

impl GlobalFlags {
    /// Flags handed to child steps so they log the same way
    pub fn forwarded(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.verbose {
            flags.push("--verbose".to_string());
        }
        if self.quiet {
            flags.push("--quiet".to_string());
        }
        flags
    }
}

#[cfg(test)]
mod tests;
