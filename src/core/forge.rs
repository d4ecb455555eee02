//! Forge API client.
//!
//! The deployment listing is a GraphQL connection (the REST listing cannot
//! be filtered by environment and state together); the single-deployment
//! fetch and release creation go through REST. Non-success responses are
//! surfaced verbatim with their status and body.

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ForgeConfig;
use crate::deployment::{DeploymentNode, DeploymentPage, DeploymentSource, PAGE_SIZE};
use crate::error::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const DEPLOYMENTS_QUERY: &str = "\
query($owner: String!, $repo: String!, $environment: String!, $pageSize: Int!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    deployments(environments: [$environment], first: $pageSize, after: $cursor, orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes { databaseId state }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

/// Full deployment record as returned by the forge. Fields beyond the three
/// this tool reads are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: i64,
    pub sha: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedRelease {
    pub html_url: String,
    pub name: String,
    pub body: String,
}

#[derive(Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<GraphQlData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct GraphQlData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    deployments: DeploymentConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentConnection {
    nodes: Vec<GraphQlDeployment>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlDeployment {
    database_id: i64,
    state: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

pub struct ForgeClient {
    client: Client,
    config: ForgeConfig,
}

impl ForgeClient {
    pub fn new(config: ForgeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("slipway/{}", VERSION))
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))?;

        Ok(Self { client, config })
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|e| Error::remote_api(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::remote_api(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Error::remote_api_failed(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::internal_json(e.to_string(), Some("parse forge response".to_string()))
        })
    }

    /// Fetch the full record for one deployment.
    pub fn deployment(&self, id: i64) -> Result<DeploymentRecord> {
        let url = format!(
            "{}/repos/{}/{}/deployments/{}",
            self.config.api_url, self.config.owner, self.config.repo, id
        );
        let value = self.send(self.client.get(&url))?;
        serde_json::from_value(value).map_err(|e| {
            Error::internal_json(e.to_string(), Some("parse deployment record".to_string()))
        })
    }

    /// Create a release against an existing tag.
    pub fn create_release(&self, tag: &str, title: &str, body: &str) -> Result<PublishedRelease> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.config.api_url, self.config.owner, self.config.repo
        );
        let payload = json!({
            "tag_name": tag,
            "name": title,
            "body": body,
        });
        let value = self.send(self.client.post(&url).json(&payload))?;
        serde_json::from_value(value).map_err(|e| {
            Error::internal_json(e.to_string(), Some("parse release response".to_string()))
        })
    }
}

impl DeploymentSource for ForgeClient {
    fn page(&self, environment: &str, cursor: Option<&str>) -> Result<DeploymentPage> {
        let payload = json!({
            "query": DEPLOYMENTS_QUERY,
            "variables": {
                "owner": self.config.owner,
                "repo": self.config.repo,
                "environment": environment,
                "pageSize": PAGE_SIZE,
                "cursor": cursor,
            },
        });

        let value = self.send(self.client.post(&self.config.graphql_url).json(&payload))?;
        let envelope: GraphQlEnvelope = serde_json::from_value(value).map_err(|e| {
            Error::internal_json(e.to_string(), Some("parse deployments page".to_string()))
        })?;

        page_from_envelope(envelope)
    }
}

fn page_from_envelope(envelope: GraphQlEnvelope) -> Result<DeploymentPage> {
    if let Some(first) = envelope.errors.as_ref().and_then(|e| e.first()) {
        return Err(Error::remote_api(format!("GraphQL error: {}", first.message)));
    }

    let connection = envelope
        .data
        .and_then(|d| d.repository)
        .map(|r| r.deployments)
        .ok_or_else(|| Error::remote_api("GraphQL response missing repository deployments"))?;

    Ok(DeploymentPage {
        nodes: connection
            .nodes
            .into_iter()
            .map(|n| DeploymentNode {
                id: n.database_id,
                state: n.state,
            })
            .collect(),
        has_next_page: connection.page_info.has_next_page,
        end_cursor: connection.page_info.end_cursor,
    })
}
