use crate::{
    credentials::{load_token, token_path, HomeDirs},
    errors::Result,
    git::{CommandRunner, Git},
    gitlab::{GitLabApi, GitLabClient, GitLabIntegration, UnprotectOutcome},
    remote::{parse_remote, ParsedRemote},
};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Unprotect {
    /// Remote whose URL identifies the GitLab project
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Read the personal access token from this file instead of ~/.gitlab_token
    #[arg(long, env = "GITLAB_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,
}

impl Unprotect {
    pub fn execute<R: CommandRunner>(&self, git: Git<R>) -> Result<()> {
        self.run(&git, &HomeDirs::from_env(), |remote, token| {
            GitLabClient::new(remote.api_base(), token)
        })?;
        Ok(())
    }

    /// Resolve the remote, read the token, then drop protection from the checked out branch.
    ///
    /// `connect` is only called once the token has been read, so a bad token file never
    /// reaches the network.
    pub fn run<R, A, F>(&self, git: &Git<R>, dirs: &HomeDirs, connect: F) -> Result<UnprotectOutcome>
    where
        R: CommandRunner,
        A: GitLabApi,
        F: FnOnce(&ParsedRemote, String) -> A,
    {
        let remote_url = git.remote_url(&self.remote)?;
        println!("Remote URL: {}", remote_url);

        let remote = parse_remote(&remote_url)?;
        println!("GitLab URL: {}", remote.base_url);
        println!("Project Path: {}", remote.project_path);

        let path = token_path(self.token_file.as_deref(), dirs)?;
        let token = load_token(&path)?;

        let branch = git.current_branch()?;
        println!("Local branch: {}", branch);

        let integration = GitLabIntegration::new(connect(&remote, token));

        let project = integration.find_project(&remote.project_path)?;
        println!("Project ID: {}", project.id);

        println!("Attempting to unprotect local branch '{}'...", branch);
        let outcome = integration.unprotect_branch(&project, &branch)?;
        match outcome {
            UnprotectOutcome::Unprotected => println!("Branch '{}' is now unprotected.", branch),
            UnprotectOutcome::NotProtected => {
                println!("Branch '{}' is not protected or does not exist.", branch)
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GlError;
    use crate::git::MockCommandRunner;
    use crate::gitlab::client::MockGitLabApi;
    use std::cell::Cell;
    use std::io::Write;

    const REMOTE_CMD: &str = "git config --get remote.origin.url";
    const BRANCH_CMD: &str = "git rev-parse --abbrev-ref HEAD";

    fn command(token_file: Option<PathBuf>) -> Unprotect {
        Unprotect {
            remote: "origin".to_string(),
            token_file,
        }
    }

    fn token_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn git(remote: &str, branch: &str) -> Git<MockCommandRunner> {
        Git::new(
            MockCommandRunner::new()
                .with_response(REMOTE_CMD, remote)
                .with_response(BRANCH_CMD, branch),
        )
    }

    #[test]
    fn test_unprotects_current_branch() {
        let file = token_file("glpat-secret\n");
        let api = MockGitLabApi::new().with_project("group/proj", 42);
        let seen = std::cell::RefCell::new(None);

        let outcome = command(Some(file.path().to_path_buf()))
            .run(&git("git@gitlab.com:group/proj.git", "main"), &HomeDirs::default(), |remote, token| {
                *seen.borrow_mut() = Some((remote.api_base(), token));
                &api
            })
            .expect("Should unprotect");

        assert_eq!(outcome, UnprotectOutcome::Unprotected);
        assert_eq!(
            seen.into_inner(),
            Some(("https://gitlab.com/api/v4".to_string(), "glpat-secret".to_string()))
        );
        assert_eq!(api.get_fetched(), vec!["group/proj".to_string()]);
        assert_eq!(api.get_deleted(), vec![(42, "main".to_string())]);
    }

    #[test]
    fn test_branch_not_protected_is_success() {
        let file = token_file("glpat-secret");
        let api = MockGitLabApi::new()
            .with_project("group/proj", 42)
            .with_delete_status(404);

        let outcome = command(Some(file.path().to_path_buf()))
            .run(&git("git@gitlab.com:group/proj.git", "main"), &HomeDirs::default(), |_, _| &api);

        assert_eq!(outcome.unwrap(), UnprotectOutcome::NotProtected);
    }

    #[test]
    fn test_unprotect_failure_is_reported() {
        let file = token_file("glpat-secret");
        let api = MockGitLabApi::new()
            .with_project("ns/sub/repo", 7)
            .with_delete_status(500);

        let outcome = command(Some(file.path().to_path_buf())).run(
            &git("https://gitlab.example.org/ns/sub/repo.git", "feature/x"),
            &HomeDirs::default(),
            |_, _| &api,
        );

        assert!(matches!(outcome, Err(GlError::Unprotect { .. })));
        assert_eq!(api.get_deleted(), vec![(7, "feature/x".to_string())]);
    }

    #[test]
    fn test_token_from_home_directory() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".gitlab_token"), "glpat-home\n").unwrap();
        let dirs = HomeDirs {
            home: Some(home.path().to_string_lossy().into_owned()),
            user_profile: None,
        };
        let api = MockGitLabApi::new().with_project("group/proj", 42);
        let token = std::cell::RefCell::new(String::new());

        command(None)
            .run(&git("git@gitlab.com:group/proj.git", "main"), &dirs, |_, t| {
                *token.borrow_mut() = t;
                &api
            })
            .unwrap();

        assert_eq!(token.into_inner(), "glpat-home");
    }

    #[test]
    fn test_empty_token_stops_before_network() {
        let file = token_file("  \n");
        let connected = Cell::new(false);
        let api = MockGitLabApi::new().with_project("group/proj", 42);
        let git = git("git@gitlab.com:group/proj.git", "main");

        let result = command(Some(file.path().to_path_buf())).run(&git, &HomeDirs::default(), |_, _| {
            connected.set(true);
            &api
        });

        assert!(matches!(result, Err(GlError::TokenLoad { .. })));
        assert!(!connected.get());
        assert!(api.get_fetched().is_empty());
    }

    #[test]
    fn test_missing_token_file_stops_before_network() {
        let home = tempfile::tempdir().unwrap();
        let dirs = HomeDirs {
            home: Some(home.path().to_string_lossy().into_owned()),
            user_profile: None,
        };
        let connected = Cell::new(false);
        let api = MockGitLabApi::new();

        let result = command(None).run(&git("git@gitlab.com:group/proj.git", "main"), &dirs, |_, _| {
            connected.set(true);
            &api
        });

        assert!(matches!(result, Err(GlError::TokenLoad { .. })));
        assert!(!connected.get());
    }

    #[test]
    fn test_project_lookup_failure_skips_unprotect() {
        let file = token_file("glpat-bad");
        let api = MockGitLabApi::new()
            .with_project("group/proj", 42)
            .with_lookup_status(401);

        let result = command(Some(file.path().to_path_buf()))
            .run(&git("git@gitlab.com:group/proj.git", "main"), &HomeDirs::default(), |_, _| &api);

        assert!(matches!(result, Err(GlError::ProjectLookup(_))));
        assert!(api.get_deleted().is_empty());
    }

    #[test]
    fn test_unsupported_remote_stops_before_token() {
        let connected = Cell::new(false);
        let api = MockGitLabApi::new();
        let git = git("/srv/git/proj.git", "main");

        let result = command(None).run(&git, &HomeDirs::default(), |_, _| {
            connected.set(true);
            &api
        });

        assert!(matches!(result, Err(GlError::UnsupportedRemote(_))));
        assert!(!connected.get());
        // Branch is only queried after the token has been read
        assert_eq!(git_calls(&git), vec![REMOTE_CMD.to_string()]);
    }

    #[test]
    fn test_missing_remote_is_fatal() {
        let git = Git::new(MockCommandRunner::new());
        let api = MockGitLabApi::new();

        let result = command(None).run(&git, &HomeDirs::default(), |_, _| &api);

        match result {
            Err(GlError::Command { command, .. }) => assert_eq!(command, REMOTE_CMD),
            other => panic!("Expected command error, got {:?}", other),
        }
    }

    fn git_calls(git: &Git<MockCommandRunner>) -> Vec<String> {
        git.runner().get_calls()
    }
}
