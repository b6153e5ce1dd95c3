use crate::errors::{GlError, Result};
use std::path::{Path, PathBuf};

pub const TOKEN_FILE_NAME: &str = ".gitlab_token";

/// Home directory candidates, captured once from the environment.
#[derive(Debug, Clone, Default)]
pub struct HomeDirs {
    pub home: Option<String>,
    pub user_profile: Option<String>,
}

impl HomeDirs {
    pub fn from_env() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            user_profile: std::env::var("USERPROFILE").ok(),
        }
    }

    /// `HOME` wins over `USERPROFILE`; empty values count as unset.
    pub fn resolve(&self) -> Option<PathBuf> {
        [&self.home, &self.user_profile]
            .into_iter()
            .flatten()
            .find(|dir| !dir.is_empty())
            .map(PathBuf::from)
    }
}

/// The token file to read: the explicit override if given, else `<home>/.gitlab_token`.
pub fn token_path(override_path: Option<&Path>, dirs: &HomeDirs) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }

    let home = dirs.resolve().ok_or(GlError::HomeNotFound)?;
    Ok(home.join(TOKEN_FILE_NAME))
}

pub fn load_token(path: &Path) -> Result<String> {
    log::debug!("Reading token from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| GlError::TokenLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let token = content.trim();
    if token.is_empty() {
        return Err(GlError::TokenLoad {
            path: path.to_path_buf(),
            reason: "Token file is empty".to_string(),
        });
    }

    Ok(token.to_string())
}
