use serde::{Deserialize, Serialize};

/// The subset of `GET /projects/:id` the tool reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: Option<String>,
    pub path_with_namespace: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnprotectOutcome {
    /// The protection rule was removed.
    Unprotected,
    /// GitLab answered 404: nothing was protected under that name, or the branch is gone.
    NotProtected,
}
