//! Release body rendering.
//!
//! Grouping uses an explicit ordered association rather than map iteration
//! order: the order categories first appear in the commit sequence is part of
//! the output contract.

use serde::Serialize;

use crate::commit::{CommitKind, CommitMetadata};

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseDraft {
    pub title: String,
    pub body: String,
}

/// Ordered (kind, entries) pairs: first-seen kind order, original relative
/// order within each group.
pub type GroupedMetadata = Vec<(CommitKind, Vec<CommitMetadata>)>;

pub fn group_by_kind(entries: impl IntoIterator<Item = CommitMetadata>) -> GroupedMetadata {
    let mut groups: GroupedMetadata = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(kind, _)| *kind == entry.kind) {
            Some((_, list)) => list.push(entry),
            None => groups.push((entry.kind, vec![entry])),
        }
    }
    groups
}

/// Render the multi-section release body.
///
/// One section per group in group order: a `symbol kind` header line, then a
/// bullet per description. Sections are separated by a blank line. Same input
/// always yields byte-identical output.
pub fn build_release_body(groups: &GroupedMetadata) -> String {
    let mut sections = Vec::with_capacity(groups.len());
    for (kind, entries) in groups {
        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(format!("{} {}", kind.symbol(), kind.as_str()));
        for entry in entries {
            lines.push(format!("- {}", entry.description));
        }
        sections.push(lines.join("\n"));
    }
    sections.join("\n\n")
}

pub fn draft(title: &str, groups: &GroupedMetadata) -> ReleaseDraft {
    ReleaseDraft {
        title: title.to_string(),
        body: build_release_body(groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::parse_conventional_commit;

    fn meta(message: &str) -> CommitMetadata {
        parse_conventional_commit(message).unwrap()
    }

    #[test]
    fn grouping_preserves_first_seen_kind_order() {
        let groups = group_by_kind([
            meta("fix: one"),
            meta("feat: two"),
            meta("feat: three"),
        ]);

        let kinds: Vec<_> = groups.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![CommitKind::Fix, CommitKind::Feat]);
        assert_eq!(groups[1].1.len(), 2);
        assert_eq!(groups[1].1[0].description, "two");
        assert_eq!(groups[1].1[1].description, "three");
    }

    #[test]
    fn grouping_of_empty_input_is_empty() {
        assert!(group_by_kind([]).is_empty());
    }

    #[test]
    fn body_is_byte_deterministic() {
        let groups = group_by_kind([
            meta("fix: resolver cursor"),
            meta("feat: deployment search"),
            meta("fix(api): retry header"),
        ]);

        let expected = "🐛 fix\n\
                        - resolver cursor\n\
                        - retry header\n\
                        \n\
                        ✨ feat\n\
                        - deployment search";
        assert_eq!(build_release_body(&groups), expected);
        assert_eq!(build_release_body(&groups), expected);
    }

    #[test]
    fn single_group_has_no_trailing_separator() {
        let groups = group_by_kind([meta("docs: readme")]);
        assert_eq!(build_release_body(&groups), "📝 docs\n- readme");
    }

    #[test]
    fn empty_groups_render_empty_body() {
        assert_eq!(build_release_body(&Vec::new()), "");
    }

    #[test]
    fn draft_carries_title_and_body() {
        let groups = group_by_kind([meta("feat: ship it")]);
        let draft = draft("v1.2.3", &groups);
        assert_eq!(draft.title, "v1.2.3");
        assert_eq!(draft.body, "✨ feat\n- ship it");
    }
}
