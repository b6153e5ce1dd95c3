use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlError {
    #[error("Command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Cannot read token from file '{}': {reason}", path.display())]
    TokenLoad { path: PathBuf, reason: String },

    #[error("Cannot locate home directory: neither HOME nor USERPROFILE is set")]
    HomeNotFound,

    #[error("Unsupported remote URL: {0}")]
    UnsupportedRemote(String),

    #[error("Remote URL '{0}' has an empty project path")]
    EmptyProjectPath(String),

    #[error("Failed to get project details: {0}")]
    ProjectLookup(String),

    #[error("Error unprotecting branch '{branch}': {reason}")]
    Unprotect { branch: String, reason: String },
}

pub type Result<T> = std::result::Result<T, GlError>;
