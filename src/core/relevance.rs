//! Workspace relevance filtering for commit sequences.
//!
//! Each commit is judged by checking out its tree and asking the build graph
//! what would rebuild downstream of its first parent, scoped to one
//! workspace. The pipeline mutates the shared working tree as it iterates,
//! so it must stay strictly sequential.

use serde::Deserialize;

use crate::commit::parse_conventional_commit;
use crate::git::{self, Commit};
use crate::utils::command;

/// What the build graph reports for one commit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildImpact {
    /// Whether the repository is configured as a multi-package build.
    #[serde(default)]
    pub monorepo: bool,
    /// Package names that would rebuild.
    #[serde(default)]
    pub packages: Vec<String>,
}

/// Seam between the relevance pipeline and repository state.
///
/// Both operations report failure as "undecidable" rather than an error:
/// a commit whose tree state or build graph cannot be inspected is excluded,
/// never fatal.
pub trait CommitProber {
    /// Move the working tree to the commit.
    fn checkout(&self, commit_id: &str) -> bool;

    /// Dry-run the build graph downstream of the commit's first parent,
    /// scoped to `workspace`.
    fn probe(&self, commit_id: &str, workspace: &str) -> Option<BuildImpact>;
}

/// Production prober: `git checkout` plus a turbo dry-run.
pub struct TurboProber {
    repo_path: String,
}

impl TurboProber {
    pub fn new(repo_path: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }
}

impl CommitProber for TurboProber {
    fn checkout(&self, commit_id: &str) -> bool {
        git::checkout(&self.repo_path, commit_id)
    }

    fn probe(&self, commit_id: &str, workspace: &str) -> Option<BuildImpact> {
        let filter = format!("--filter={}...[{}^]", workspace, commit_id);
        let stdout = command::run_in_optional(
            &self.repo_path,
            "turbo",
            &["run", "build", &filter, "--dry-run=json"],
        )?;
        parse_dry_run(&stdout)
    }
}

fn parse_dry_run(stdout: &str) -> Option<BuildImpact> {
    serde_json::from_str(stdout).ok()
}

/// The sub-sequence of commits that are both conventionally formatted and
/// relevant to `workspace`, in original order.
///
/// Per commit: checkout, then probe, then include iff the message matches
/// the conventional grammar AND (the build is not a monorepo OR the
/// workspace is among the affected packages). Any per-commit failure
/// excludes that commit silently.
pub fn filter_relevant(
    commits: &[Commit],
    workspace: &str,
    prober: &dyn CommitProber,
) -> Vec<Commit> {
    let mut relevant = Vec::new();

    for commit in commits {
        if !prober.checkout(&commit.id) {
            continue;
        }
        let Some(impact) = prober.probe(&commit.id, workspace) else {
            continue;
        };
        if parse_conventional_commit(&commit.message).is_none() {
            continue;
        }
        if impact.monorepo && !impact.packages.iter().any(|p| p == workspace) {
            continue;
        }
        relevant.push(commit.clone());
    }

    relevant
}
