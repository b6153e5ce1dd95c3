use crate::errors::Result;
use crate::gitlab::{GitLabApi, Project, UnprotectOutcome};

pub struct GitLabIntegration<T: GitLabApi> {
    pub api: T,
}

impl<T: GitLabApi> GitLabIntegration<T> {
    pub fn new(api: T) -> Self {
        Self { api }
    }

    /// Look up the project behind `project_path`. Without its id nothing else can run.
    pub fn find_project(&self, project_path: &str) -> Result<Project> {
        let project = self.api.fetch_project(project_path).map_err(|e| {
            log::error!("Failed to get project details for {}: {}", project_path, e);
            e
        })?;

        log::debug!(
            "Resolved {} to project {} ({})",
            project.path_with_namespace.as_deref().unwrap_or(project_path),
            project.id,
            project.name.as_deref().unwrap_or("unnamed")
        );
        Ok(project)
    }

    pub fn unprotect_branch(&self, project: &Project, branch: &str) -> Result<UnprotectOutcome> {
        match self.api.delete_protected_branch(project.id, branch) {
            Ok(outcome) => {
                log::debug!("Unprotect {} on project {}: {:?}", branch, project.id, outcome);
                Ok(outcome)
            }
            Err(e) => {
                log::error!("❌ Failed to unprotect {} on project {}: {}", branch, project.id, e);
                Err(e)
            }
        }
    }
}
