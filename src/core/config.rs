//! Forge target resolution from flags and environment.
//!
//! The CLI does not manage credentials; it reads a bearer token from the
//! environment and attaches it verbatim. Repository coordinates come from
//! `--repo owner/name` or the standard CI environment variables.

use std::env;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

#[derive(Debug, Clone)]
pub struct ForgeConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub api_url: String,
    pub graphql_url: String,
}

impl ForgeConfig {
    /// Resolve the forge target.
    ///
    /// Slug precedence: `--repo` flag, then SLIPWAY_REPOSITORY, then
    /// GITHUB_REPOSITORY. Token comes from GITHUB_TOKEN. API endpoints may
    /// be overridden for forge-compatible hosts via GITHUB_API_URL and
    /// GITHUB_GRAPHQL_URL.
    pub fn resolve(repo_flag: Option<&str>) -> Result<Self> {
        let slug = match repo_flag {
            Some(s) => s.to_string(),
            None => env::var("SLIPWAY_REPOSITORY")
                .or_else(|_| env::var("GITHUB_REPOSITORY"))
                .map_err(|_| {
                    Error::config_missing_key("repository")
                        .with_hint("Pass --repo owner/name or set GITHUB_REPOSITORY")
                })?,
        };
        let (owner, repo) = parse_slug(&slug)?;

        let token = env::var("GITHUB_TOKEN").map_err(|_| {
            Error::config_missing_key("GITHUB_TOKEN")
                .with_hint("Export a token with repo and deployments read scope")
        })?;

        let api_url = env_or_default("GITHUB_API_URL", DEFAULT_API_URL);
        let graphql_url = env_or_default("GITHUB_GRAPHQL_URL", DEFAULT_GRAPHQL_URL);

        Ok(Self {
            owner,
            repo,
            token,
            api_url,
            graphql_url,
        })
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim_end_matches('/').to_string(),
        _ => default.to_string(),
    }
}

/// Split an `owner/name` slug into its two halves.
pub fn parse_slug(slug: &str) -> Result<(String, String)> {
    let invalid = || {
        Error::config_invalid_value(
            "repository",
            format!("Expected owner/name, got '{}'", slug),
        )
    };

    let (owner, repo) = slug.split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}
