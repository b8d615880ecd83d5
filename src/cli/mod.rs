pub mod args;
pub mod dispatcher;

pub use args::{BuildDeploy, Cli, Command, DeployArg, GlobalFlags};
