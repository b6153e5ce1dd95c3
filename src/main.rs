use clap::Parser;
use commands::unprotect::Unprotect;
use git::{Git, ProcessRunner};

mod commands;
mod credentials;
mod errors;
mod git;
mod gitlab;
mod remote;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "glunprotect")]
#[command(about = "Remove branch protection from the checked out branch on GitLab", long_about = None)]
struct Cli {
    #[command(flatten)]
    unprotect: Unprotect,
}

fn main() {
    env_logger::init();

    let args = Cli::parse();

    let git = Git::new(ProcessRunner::new());

    if let Err(e) = args.unprotect.execute(git) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
