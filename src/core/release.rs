//! Release note orchestration: range → relevance → grouping → draft.

use crate::commit::parse_conventional_commit;
use crate::error::Result;
use crate::forge::{ForgeClient, PublishedRelease};
use crate::git;
use crate::notes::{self, ReleaseDraft};
use crate::relevance::{filter_relevant, CommitProber};

pub struct NotesRequest<'a> {
    pub repo_path: &'a str,
    pub workspace: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub title: &'a str,
}

/// Outcome of a notes run: the draft plus how many commits fed it.
#[derive(Debug)]
pub struct PreparedNotes {
    pub draft: ReleaseDraft,
    pub commit_count: usize,
}

/// Build a release draft for the commits in `from..to` that are relevant to
/// the workspace.
///
/// Ok(None) means the range resolved but nothing qualifies; the caller
/// reports that as a no-release outcome, not a failure. The relevance pass
/// leaves the working tree on the last probed commit; restoring the
/// original ref is the caller's responsibility.
pub fn prepare_notes(
    request: &NotesRequest,
    prober: &dyn CommitProber,
) -> Result<Option<PreparedNotes>> {
    let commits = git::read_commit_range(request.repo_path, request.from, request.to)?;
    crate::log_status!(
        "release",
        "Scanning {} commits for workspace {}",
        commits.len(),
        request.workspace
    );

    let relevant = filter_relevant(&commits, request.workspace, prober);
    if relevant.is_empty() {
        return Ok(None);
    }

    // Relevance already required the grammar to match; parse again here to
    // extract the metadata.
    let entries: Vec<_> = relevant
        .iter()
        .filter_map(|c| parse_conventional_commit(&c.message))
        .collect();
    let groups = notes::group_by_kind(entries);

    Ok(Some(PreparedNotes {
        draft: notes::draft(request.title, &groups),
        commit_count: relevant.len(),
    }))
}

/// Publish a prepared draft as a release against `tag`.
pub fn publish(client: &ForgeClient, tag: &str, draft: &ReleaseDraft) -> Result<PublishedRelease> {
    crate::log_status!("release", "Publishing release {}", tag);
    client.create_release(tag, &draft.title, &draft.body)
}
