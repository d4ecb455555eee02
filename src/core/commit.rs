use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Closed set of conventional commit categories.
///
/// Unknown categories are unrepresentable: a message whose type token is not
/// in this set simply does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitKind {
    Build,
    Chore,
    Ci,
    Docs,
    Feat,
    Fix,
    Perf,
    Refactor,
    Revert,
    Style,
    Test,
}

impl CommitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitKind::Build => "build",
            CommitKind::Chore => "chore",
            CommitKind::Ci => "ci",
            CommitKind::Docs => "docs",
            CommitKind::Feat => "feat",
            CommitKind::Fix => "fix",
            CommitKind::Perf => "perf",
            CommitKind::Refactor => "refactor",
            CommitKind::Revert => "revert",
            CommitKind::Style => "style",
            CommitKind::Test => "test",
        }
    }

    /// Display symbol used for section headers in release bodies.
    pub fn symbol(&self) -> &'static str {
        match self {
            CommitKind::Build => "📦",
            CommitKind::Chore => "🧹",
            CommitKind::Ci => "🤖",
            CommitKind::Docs => "📝",
            CommitKind::Feat => "✨",
            CommitKind::Fix => "🐛",
            CommitKind::Perf => "⚡",
            CommitKind::Refactor => "♻️",
            CommitKind::Revert => "⏪",
            CommitKind::Style => "💄",
            CommitKind::Test => "✅",
        }
    }

    /// Case-sensitive lookup; only lowercase tokens match.
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "build" => Some(CommitKind::Build),
            "chore" => Some(CommitKind::Chore),
            "ci" => Some(CommitKind::Ci),
            "docs" => Some(CommitKind::Docs),
            "feat" => Some(CommitKind::Feat),
            "fix" => Some(CommitKind::Fix),
            "perf" => Some(CommitKind::Perf),
            "refactor" => Some(CommitKind::Refactor),
            "revert" => Some(CommitKind::Revert),
            "style" => Some(CommitKind::Style),
            "test" => Some(CommitKind::Test),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitMetadata {
    pub kind: CommitKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub description: String,
}

// Anchored `type(scope)?: description` grammar. The kind token is matched
// loosely here and narrowed through the closed CommitKind set, so the
// enumeration lives in exactly one place.
fn grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^([a-z]+)(?:\(([^)]*)\))?: (.*)$").expect("Invalid commit grammar pattern")
    })
}

/// Parse a commit message into structured metadata.
///
/// Total: any message that does not match the grammar (wrong casing, unknown
/// type, missing `": "` separator) yields None rather than an error.
pub fn parse_conventional_commit(message: &str) -> Option<CommitMetadata> {
    let caps = grammar().captures(message)?;
    let kind = CommitKind::from_token(caps.get(1)?.as_str())?;
    let scope = caps.get(2).map(|m| m.as_str().to_string());
    let description = caps.get(3)?.as_str().to_string();

    Some(CommitMetadata {
        kind,
        scope,
        description,
    })
}
