// Remote URL related

use crate::errors::{GlError, Result};
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

static SCP_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@(?P<domain>[^:/]+):(?P<path>.*)$").expect("scp-like remote pattern is valid")
});

/// Where the GitLab instance lives and which project the remote points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRemote {
    pub base_url: String,
    pub project_path: String,
}

impl ParsedRemote {
    pub fn api_base(&self) -> String {
        format!("{}/api/v4", self.base_url)
    }
}

/// Split a remote URL into the instance base URL and the project path.
///
/// Accepts `git@host:namespace/project.git` and `https://host/namespace/project.git`
/// (plain `http://` too). Anything else is rejected.
pub fn parse_remote(remote_url: &str) -> Result<ParsedRemote> {
    let remote_url = remote_url.trim();

    let (base_url, project_path) = if remote_url.starts_with("git@") {
        parse_scp_like(remote_url)?
    } else if remote_url.starts_with("https://") || remote_url.starts_with("http://") {
        parse_web_url(remote_url)?
    } else {
        return Err(GlError::UnsupportedRemote(remote_url.to_string()));
    };

    let project_path = strip_git_suffix(&project_path).to_string();
    if project_path.is_empty() {
        return Err(GlError::EmptyProjectPath(remote_url.to_string()));
    }

    Ok(ParsedRemote {
        base_url,
        project_path,
    })
}

fn parse_scp_like(remote_url: &str) -> Result<(String, String)> {
    let caps = SCP_LIKE_RE
        .captures(remote_url)
        .ok_or_else(|| GlError::UnsupportedRemote(remote_url.to_string()))?;

    Ok((
        format!("https://{}", &caps["domain"]),
        caps["path"].to_string(),
    ))
}

fn parse_web_url(remote_url: &str) -> Result<(String, String)> {
    let url = Url::parse(remote_url)
        .map_err(|e| GlError::UnsupportedRemote(format!("{}: {}", remote_url, e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| GlError::UnsupportedRemote(remote_url.to_string()))?;

    // `Url` already drops the scheme's default port
    let base_url = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };

    let project_path = url.path().strip_prefix('/').unwrap_or(url.path());

    Ok((base_url, project_path.to_string()))
}

/// Remove exactly one trailing `.git`.
pub fn strip_git_suffix(path: &str) -> &str {
    path.strip_suffix(".git").unwrap_or(path)
}
