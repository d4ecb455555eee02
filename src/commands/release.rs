use clap::{Args, Subcommand};
use serde::Serialize;

use slipway::config::ForgeConfig;
use slipway::forge::ForgeClient;
use slipway::git;
use slipway::release::{self, NotesRequest, PreparedNotes};
use slipway::relevance::TurboProber;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ReleaseArgs {
    #[command(subcommand)]
    pub command: ReleaseCommand,
}

#[derive(Subcommand)]
pub enum ReleaseCommand {
    /// Render the release body for a commit range without publishing
    Notes(NotesArgs),
    /// Build the release body and publish it against a tag
    Publish(PublishArgs),
}

#[derive(Args)]
pub struct NotesArgs {
    /// Build workspace whose commits qualify
    #[arg(long, short = 'w')]
    pub workspace: String,

    /// Range start ref (excluded from the range)
    #[arg(long)]
    pub from: String,

    /// Range end ref (included; same as --from means that single commit)
    #[arg(long)]
    pub to: String,

    /// Repository checkout to scan
    #[arg(long, default_value = ".")]
    pub path: String,

    /// Release title (defaults to the tag for publish, the end ref for notes)
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Args)]
pub struct PublishArgs {
    #[command(flatten)]
    pub notes: NotesArgs,

    /// Tag to create the release against
    #[arg(long)]
    pub tag: String,

    /// Repository slug (owner/name); defaults to $GITHUB_REPOSITORY
    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Serialize)]
pub struct NotesOutput {
    pub commit_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize)]
pub struct PublishOutput {
    pub released: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ReleaseCommandOutput {
    Notes(NotesOutput),
    Publish(PublishOutput),
}

pub fn run(args: ReleaseArgs, _global: &GlobalArgs) -> CmdResult<ReleaseCommandOutput> {
    match args.command {
        ReleaseCommand::Notes(args) => {
            let (output, code) = notes(args)?;
            Ok((ReleaseCommandOutput::Notes(output), code))
        }
        ReleaseCommand::Publish(args) => {
            let (output, code) = publish(args)?;
            Ok((ReleaseCommandOutput::Publish(output), code))
        }
    }
}

/// Run the relevance pipeline, then put the working tree back on whatever
/// ref the caller had checked out. The restore is best-effort: the pipeline
/// result wins over a failed checkout.
fn prepare(args: &NotesArgs, title: &str) -> slipway::Result<Option<PreparedNotes>> {
    let prober = TurboProber::new(args.path.as_str());
    let original = git::current_ref(&args.path);

    let request = NotesRequest {
        repo_path: &args.path,
        workspace: &args.workspace,
        from: &args.from,
        to: &args.to,
        title,
    };
    let result = release::prepare_notes(&request, &prober);

    if let Some(reference) = original {
        git::checkout(&args.path, &reference);
    }

    result
}

fn notes(args: NotesArgs) -> CmdResult<NotesOutput> {
    let title = args.title.clone().unwrap_or_else(|| args.to.clone());

    match prepare(&args, &title)? {
        Some(prepared) => Ok((
            NotesOutput {
                commit_count: prepared.commit_count,
                title: Some(prepared.draft.title),
                body: Some(prepared.draft.body),
                warning: None,
            },
            0,
        )),
        None => Ok((
            NotesOutput {
                commit_count: 0,
                title: None,
                body: None,
                warning: Some(no_release_warning(&args)),
            },
            0,
        )),
    }
}

fn publish(args: PublishArgs) -> CmdResult<PublishOutput> {
    let config = ForgeConfig::resolve(args.repo.as_deref())?;
    let client = ForgeClient::new(config)?;

    let title = args.notes.title.clone().unwrap_or_else(|| args.tag.clone());

    let Some(prepared) = prepare(&args.notes, &title)? else {
        return Ok((
            PublishOutput {
                released: false,
                url: None,
                title: None,
                body: None,
                warning: Some(no_release_warning(&args.notes)),
            },
            0,
        ));
    };

    let published = release::publish(&client, &args.tag, &prepared.draft)?;

    Ok((
        PublishOutput {
            released: true,
            url: Some(published.html_url),
            title: Some(published.name),
            body: Some(published.body),
            warning: None,
        },
        0,
    ))
}

fn no_release_warning(args: &NotesArgs) -> String {
    format!(
        "No commits in {}..{} are relevant to {}; nothing to release",
        args.from, args.to, args.workspace
    )
}
