pub mod client;
pub mod integration;
pub mod types;


pub use client::{GitLabApi, GitLabClient};
pub use integration::GitLabIntegration;
pub use types::{Project, UnprotectOutcome};
