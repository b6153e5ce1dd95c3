use crate::errors::{GlError, Result};
use crate::gitlab::types::{Project, UnprotectOutcome};
use reqwest::blocking::Client;
use reqwest::StatusCode;
#[cfg(test)]
use std::collections::HashMap;

const TOKEN_HEADER: &str = "Private-Token";

pub trait GitLabApi {
    fn fetch_project(&self, project_path: &str) -> Result<Project>;
    fn delete_protected_branch(&self, project_id: u64, branch: &str) -> Result<UnprotectOutcome>;
}

impl<T: GitLabApi + ?Sized> GitLabApi for &T {
    fn fetch_project(&self, project_path: &str) -> Result<Project> {
        (**self).fetch_project(project_path)
    }

    fn delete_protected_branch(&self, project_id: u64, branch: &str) -> Result<UnprotectOutcome> {
        (**self).delete_protected_branch(project_id, branch)
    }
}

pub fn project_url(api_base: &str, project_path: &str) -> String {
    format!("{}/projects/{}", api_base, urlencoding::encode(project_path))
}

pub fn protected_branch_url(api_base: &str, project_id: u64, branch: &str) -> String {
    format!(
        "{}/projects/{}/protected_branches/{}",
        api_base,
        project_id,
        urlencoding::encode(branch)
    )
}

/// Map the DELETE status to an outcome. 404 is a normal answer, not a failure.
pub fn classify_unprotect(status: StatusCode, branch: &str, body: &str) -> Result<UnprotectOutcome> {
    if status.is_success() {
        return Ok(UnprotectOutcome::Unprotected);
    }
    if status == StatusCode::NOT_FOUND {
        return Ok(UnprotectOutcome::NotProtected);
    }

    Err(GlError::Unprotect {
        branch: branch.to_string(),
        reason: describe_status(status, body),
    })
}

fn describe_status(status: StatusCode, body: &str) -> String {
    match body.trim() {
        "" => format!("HTTP {}", status),
        body => format!("HTTP {}: {}", status, body),
    }
}

pub struct GitLabClient {
    api_base: String,
    token: String,
    http: Client,
}

impl GitLabClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.into(),
            http: Client::new(),
        }
    }
}

impl GitLabApi for GitLabClient {
    fn fetch_project(&self, project_path: &str) -> Result<Project> {
        let url = project_url(&self.api_base, project_path);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .map_err(|e| GlError::ProjectLookup(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GlError::ProjectLookup(format!("GET {}: {}", url, e)))?;
        log::debug!("GET {} -> {}", url, status);

        if !status.is_success() {
            return Err(GlError::ProjectLookup(format!(
                "GET {}: {}",
                url,
                describe_status(status, &body)
            )));
        }

        serde_json::from_str::<Project>(&body)
            .map_err(|e| GlError::ProjectLookup(format!("GET {}: unexpected response body: {}", url, e)))
    }

    fn delete_protected_branch(&self, project_id: u64, branch: &str) -> Result<UnprotectOutcome> {
        let url = protected_branch_url(&self.api_base, project_id, branch);
        log::debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .map_err(|e| GlError::Unprotect {
                branch: branch.to_string(),
                reason: format!("DELETE {}: {}", url, e),
            })?;

        let status = response.status();
        log::debug!("DELETE {} -> {}", url, status);

        // The body only matters for the error message
        let body = response.text().unwrap_or_default();
        classify_unprotect(status, branch, &body)
    }
}

/// Serves projects from memory and answers DELETE with a fixed status.
#[cfg(test)]
pub struct MockGitLabApi {
    pub projects: HashMap<String, u64>,
    pub lookup_status: StatusCode,
    pub delete_status: StatusCode,
    pub fetched: std::sync::Mutex<Vec<String>>,
    pub deleted: std::sync::Mutex<Vec<(u64, String)>>,
}

#[cfg(test)]
impl MockGitLabApi {
    pub fn new() -> Self {
        Self {
            projects: HashMap::new(),
            lookup_status: StatusCode::OK,
            delete_status: StatusCode::NO_CONTENT,
            fetched: std::sync::Mutex::new(Vec::new()),
            deleted: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_project(mut self, path: &str, id: u64) -> Self {
        self.projects.insert(path.to_string(), id);
        self
    }

    pub fn with_lookup_status(mut self, status: u16) -> Self {
        self.lookup_status = StatusCode::from_u16(status).unwrap();
        self
    }

    pub fn with_delete_status(mut self, status: u16) -> Self {
        self.delete_status = StatusCode::from_u16(status).unwrap();
        self
    }

    pub fn get_fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn get_deleted(&self) -> Vec<(u64, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl GitLabApi for MockGitLabApi {
    fn fetch_project(&self, project_path: &str) -> Result<Project> {
        self.fetched.lock().unwrap().push(project_path.to_string());

        if !self.lookup_status.is_success() {
            return Err(GlError::ProjectLookup(describe_status(self.lookup_status, "")));
        }

        match self.projects.get(project_path) {
            Some(id) => Ok(Project {
                id: *id,
                name: None,
                path_with_namespace: Some(project_path.to_string()),
            }),
            None => Err(GlError::ProjectLookup(describe_status(
                StatusCode::NOT_FOUND,
                r#"{"message":"404 Project Not Found"}"#,
            ))),
        }
    }

    fn delete_protected_branch(&self, project_id: u64, branch: &str) -> Result<UnprotectOutcome> {
        self.deleted
            .lock()
            .unwrap()
            .push((project_id, branch.to_string()));
        classify_unprotect(self.delete_status, branch, "")
    }
}
