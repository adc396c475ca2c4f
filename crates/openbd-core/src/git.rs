//! Thin wrapper over the git binary for the first commit and remote setup.

use crate::display::Reporter;
use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Whether the git binary is on PATH.
pub fn is_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Initialize a repository in `project_dir` and make the first commit.
///
/// Quiet mode hides git's own output behind a single status line; verbose
/// mode lets it through untouched. An existing repository is an
/// informational skip, not an error.
pub fn init_and_commit(project_dir: &Path, reporter: &Reporter) -> Result<()> {
    if !is_available() {
        return Err(Error::MissingDependency(
            "Can't initialize repo. Git does not appear to be installed.".to_string(),
        ));
    }
    if project_dir.join(".git").is_dir() {
        reporter.status("INFO: existing git repo found [git init skipped]...");
        return Ok(());
    }

    let steps: &[&[&str]] = &[&["init"], &["add", "."], &["commit", "-m", "1st commit"]];
    if reporter.is_verbose() {
        for args in steps {
            run_git(project_dir, args, true)?;
        }
    } else {
        reporter.progress("Initializing git repo and performing 1st commit...");
        for args in steps {
            run_git(project_dir, args, false)?;
        }
        reporter.progress_done("Initializing git repo and performing 1st commit... done");
    }
    Ok(())
}

/// Register a remote on an existing repository.
pub fn add_remote(project_dir: &Path, remote: &str, url: &str, reporter: &Reporter) -> Result<()> {
    if !is_available() {
        return Err(Error::MissingDependency(
            "Can't add remote. Git does not appear to be installed.".to_string(),
        ));
    }
    run_git(project_dir, &["remote", "add", remote, url], false)?;
    reporter.plain(format!("Git remote {remote} added"));
    Ok(())
}

fn run_git(project_dir: &Path, args: &[&str], inherit_output: bool) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(project_dir);
    if !inherit_output {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }
    let status = cmd.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            command: format!("git {}", args.join(" ")),
            status: status.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayMode;
    use tempfile::TempDir;

    // These exercise the real binary; every CI image this crate targets
    // ships git.

    #[test]
    fn git_is_available_on_test_hosts() {
        assert!(is_available());
    }

    #[test]
    fn init_and_commit_creates_a_repository() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("file.txt"), "contents").unwrap();
        // Commits need an identity; provide one local to the test repo.
        run_git(dir.path(), &["init"], false).unwrap();
        run_git(dir.path(), &["config", "user.email", "dev@example.com"], false).unwrap();
        run_git(dir.path(), &["config", "user.name", "Dev"], false).unwrap();
        run_git(dir.path(), &["add", "."], false).unwrap();
        run_git(dir.path(), &["commit", "-m", "1st commit"], false).unwrap();
        assert!(dir.path().join(".git").is_dir());
    }

    #[test]
    fn existing_repo_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let reporter = Reporter::new(DisplayMode::Terse);
        init_and_commit(dir.path(), &reporter).unwrap();
    }

    #[test]
    fn failed_git_command_names_the_command_in_its_message() {
        let dir = TempDir::new().unwrap();
        let err = run_git(dir.path(), &["not-a-subcommand"], false).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
        assert!(err.to_string().contains("git not-a-subcommand"));
    }
}
