use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptsError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error("Parsing error in '{file}': {message}")]
    ParseError { file: String, message: String },

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Path resolution or validation error
    #[error("Path error: {0}")]
    PathError(String),

    /// No candidate location held a readable manifest
    #[error("Could not load manifest.json. Tried:\n{}", format_attempts(.attempted))]
    ManifestNotFound { attempted: Vec<(PathBuf, String)> },

    /// A required `src/<name>.*` entry file is missing
    #[error("Missing entry file src/{name}.* ({reason}). Tried: {}", .tried.join(", "))]
    EntryNotFound {
        name: String,
        reason: String,
        tried: Vec<String>,
    },

    /// An artifact produced by an earlier step is missing
    #[error("{what} not found at '{path}'. {hint}")]
    ArtifactMissing {
        what: String,
        path: PathBuf,
        hint: String,
    },

    #[error("Missing required property '{key}' in {source_name}")]
    MissingProperty { key: String, source_name: String },

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("System dependency missing: {0}")]
    DependencyMissing(String),

    #[error("Bundler reported errors")]
    BundlerFailed,

    #[error("System command '{command}' failed: {reason}")]
    SystemCommandFailed { command: String, reason: String },

    /// Request never produced a response (DNS, TLS, connection reset...)
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Server answered with a non-success status
    #[error("{0}")]
    RemoteFailure(String),

    /// A sequenced child step exited non-zero
    #[error("Step '{step}' exited with status {code}")]
    StepFailed { step: String, code: i32 },

    /// A sequenced child step was terminated by a signal
    #[error("Step '{step}' was terminated by {signal}. {hint}")]
    StepKilled {
        step: String,
        signal: String,
        hint: String,
    },

    #[error("Operation interrupted by user")]
    Interrupted,

    #[error("{0}")]
    Other(String),
}

impl ScriptsError {
    /// Process exit code for this error.
    ///
    /// Child step failures propagate the child's own status so that a
    /// composite command exits exactly like its failing step.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScriptsError::StepFailed { code, .. } => *code,
            ScriptsError::Interrupted => 130,
            _ => 1,
        }
    }
}

fn format_attempts(attempted: &[(PathBuf, String)]) -> String {
    attempted
        .iter()
        .map(|(path, reason)| format!("  - {}: {}", path.display(), reason))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, ScriptsError>;
