pub mod build;
pub mod create_addon;
pub mod deploy;
pub mod dev;
pub mod setup;
pub mod sign;
pub mod zip;

use crate::config::Environment;
use crate::error::{Result, ScriptsError};
use crate::project_identity::{BUILD_DIR_NAME, DIST_DIR_NAME, SRC_DIR_NAME, STATIC_DIR_NAME};
use std::path::{Path, PathBuf};

/// Where a command runs and what it can see.
#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    pub env: Environment,
    /// Global flags handed on to child steps
    pub forwarded: Vec<String>,
}

impl Context {
    pub fn new(root: &Path, env: Environment) -> Self {
        Self {
            root: root.to_path_buf(),
            env,
            forwarded: Vec::new(),
        }
    }

    /// Context for the current working directory and process environment
    pub fn from_process(forwarded: Vec<String>) -> Result<Self> {
        let root = std::env::current_dir().map_err(|e| {
            ScriptsError::PathError(format!("Could not determine working directory: {}", e))
        })?;
        Ok(Self {
            root,
            env: Environment::process(),
            forwarded,
        })
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR_NAME)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(DIST_DIR_NAME)
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join(SRC_DIR_NAME)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join(STATIC_DIR_NAME)
    }
}
