use clap::{Args, Subcommand};
use serde::Serialize;

use slipway::config::ForgeConfig;
use slipway::deployment::{resolve_nth, CountedStates, ResolveOptions};
use slipway::forge::{DeploymentRecord, ForgeClient};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct DeploymentArgs {
    #[command(subcommand)]
    pub command: DeploymentCommand,
}

#[derive(Subcommand)]
pub enum DeploymentCommand {
    /// Find the Nth most recent matching deployment in an environment
    Find(FindArgs),
}

#[derive(Args)]
pub struct FindArgs {
    /// Deployment environment to search (e.g. production)
    #[arg(long, short = 'e')]
    pub environment: String,

    /// Which occurrence to return, counting from the most recent
    #[arg(long, default_value_t = 1)]
    pub nth: u32,

    /// Count only ACTIVE deployments (superseded INACTIVE records count otherwise)
    #[arg(long)]
    pub active_only: bool,

    /// Repository slug (owner/name); defaults to $GITHUB_REPOSITORY
    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Serialize)]
pub struct FindOutput {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub fn run(args: DeploymentArgs, _global: &GlobalArgs) -> CmdResult<FindOutput> {
    match args.command {
        DeploymentCommand::Find(args) => find(args),
    }
}

fn find(args: FindArgs) -> CmdResult<FindOutput> {
    let config = ForgeConfig::resolve(args.repo.as_deref())?;
    let client = ForgeClient::new(config)?;

    let options = ResolveOptions {
        counted: if args.active_only {
            CountedStates::ActiveOnly
        } else {
            CountedStates::ActiveAndInactive
        },
        ..Default::default()
    };

    slipway::log_status!(
        "deployment",
        "Searching {} for occurrence {}",
        args.environment,
        args.nth
    );

    match resolve_nth(&client, &args.environment, args.nth, &options)? {
        Some(id) => {
            let record = client.deployment(id)?;
            Ok((
                FindOutput {
                    found: true,
                    deployment_id: Some(record.id),
                    sha: Some(record.sha.clone()),
                    deployment: Some(record),
                    warning: None,
                },
                0,
            ))
        }
        None => Ok((
            FindOutput {
                found: false,
                deployment_id: None,
                sha: None,
                deployment: None,
                warning: Some(format!(
                    "Fewer than {} matching deployments in {}",
                    args.nth, args.environment
                )),
            },
            0,
        )),
    }
}
