//! Local repository queries over the system `git` binary.

use serde::Serialize;
use std::process::Command;

use crate::error::{Error, Result};
use crate::utils::command;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
}

const LOG_FORMAT: &str = "--format=%H|%s";

fn run_git(path: &str, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .map_err(|e| Error::git_command_failed(format!("Failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(Error::git_command_failed(format!(
            "git {} failed: {}",
            args.first().unwrap_or(&""),
            command::error_text(&output)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Read the commit range `from..to` (oldest excluded, newest included),
/// ordered as git returns it (newest first).
///
/// `from == to` is a single-commit range, not an error. A non-zero git exit
/// (unknown ref, unrelated histories) is a range-resolution error and fatal
/// to the caller.
pub fn read_commit_range(path: &str, from: &str, to: &str) -> Result<Vec<Commit>> {
    let stdout = if from == to {
        run_git(path, &["log", "-1", to, LOG_FORMAT])?
    } else {
        let range = format!("{}..{}", from, to);
        run_git(path, &["log", &range, LOG_FORMAT])?
    };

    Ok(parse_log(&stdout))
}

fn parse_log(stdout: &str) -> Vec<Commit> {
    stdout
        .lines()
        .filter_map(|line| {
            let (id, message) = line.split_once('|')?;
            Some(Commit {
                id: id.to_string(),
                message: message.to_string(),
            })
        })
        .collect()
}

/// Move the working tree to a commit or ref. Failure is reported, not raised;
/// relevance probing treats an impossible checkout as "skip this commit".
pub fn checkout(path: &str, reference: &str) -> bool {
    command::succeeded_in(path, "git", &["checkout", "--quiet", reference])
}

/// Current branch name, or the commit id when HEAD is detached.
pub fn current_ref(path: &str) -> Option<String> {
    command::run_in_optional(path, "git", &["symbolic-ref", "--quiet", "--short", "HEAD"])
        .or_else(|| command::run_in_optional(path, "git", &["rev-parse", "HEAD"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "slipway-test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "slipway-test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {:?}: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn commit(dir: &Path, message: &str) -> String {
        std::fs::write(dir.join("file.txt"), message).expect("write file");
        git(dir, &["add", "-A"]);
        git(dir, &["commit", "-m", message]);
        git(dir, &["rev-parse", "HEAD"])
    }

    fn init_repo(dir: &Path) {
        git(dir, &["init", "-q", "-b", "main"]);
    }

    #[test]
    fn reads_range_newest_first_excluding_from() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());
        let first = commit(tmp.path(), "chore: seed");
        let second = commit(tmp.path(), "feat: second");
        let third = commit(tmp.path(), "fix: third");

        let path = tmp.path().to_str().unwrap();
        let commits = read_commit_range(path, &first, &third).unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id, third);
        assert_eq!(commits[0].message, "fix: third");
        assert_eq!(commits[1].id, second);
        assert_eq!(commits[1].message, "feat: second");
    }

    #[test]
    fn identical_refs_read_as_single_commit_range() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());
        let only = commit(tmp.path(), "feat: lonely");

        let path = tmp.path().to_str().unwrap();
        let commits = read_commit_range(path, &only, &only).unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].id, only);
        assert_eq!(commits[0].message, "feat: lonely");
    }

    #[test]
    fn unknown_ref_is_a_range_resolution_error() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());
        commit(tmp.path(), "chore: seed");

        let path = tmp.path().to_str().unwrap();
        let err = read_commit_range(path, "no-such-ref", "HEAD").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::GitCommandFailed);
    }

    #[test]
    fn checkout_and_current_ref_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());
        let first = commit(tmp.path(), "chore: seed");
        commit(tmp.path(), "feat: second");

        let path = tmp.path().to_str().unwrap();
        assert_eq!(current_ref(path).as_deref(), Some("main"));

        assert!(checkout(path, &first));
        assert_eq!(current_ref(path).as_deref(), Some(first.as_str()));

        assert!(checkout(path, "main"));
        assert_eq!(current_ref(path).as_deref(), Some("main"));
    }

    #[test]
    fn checkout_of_unknown_ref_reports_failure() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());
        commit(tmp.path(), "chore: seed");

        assert!(!checkout(tmp.path().to_str().unwrap(), "does-not-exist"));
    }
}
