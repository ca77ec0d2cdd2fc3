use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "github.com";

/// Repository coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    #[cfg(test)]
    pub fn new(owner: &str, name: &str) -> Self {
        Self::with_host(DEFAULT_HOST, owner, name)
    }

    pub fn with_host(host: &str, owner: &str, name: &str) -> Self {
        Self {
            host: normalize_host(host),
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// GraphQL endpoint serving this repository's host
    pub fn graphql_url(&self) -> String {
        if self.host == DEFAULT_HOST {
            "https://api.github.com/graphql".to_string()
        } else {
            format!("https://{}/api/graphql", self.host)
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host == DEFAULT_HOST {
            write!(f, "{}/{}", self.owner, self.name)
        } else {
            write!(f, "{}/{}/{}", self.host, self.owner, self.name)
        }
    }
}

pub fn normalize_host(host: &str) -> String {
    let lower = host.to_lowercase();
    let host = lower.strip_prefix("www.").unwrap_or(lower.as_str());
    if host == "ssh.github.com" {
        DEFAULT_HOST.to_string()
    } else {
        host.to_string()
    }
}

/// An issue or pull request comment
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// GraphQL node ID
    pub id: String,
    pub body: String,
    pub viewer_did_author: bool,
}

/// Replacement of a single comment body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdateRequest {
    #[serde(rename = "id")]
    pub comment_id: String,
    #[serde(rename = "body")]
    pub new_body: String,
}

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentsData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub issue_or_pull_request: Option<IssueOrPullRequest>,
}

#[derive(Debug, Deserialize)]
pub struct IssueOrPullRequest {
    pub comments: Option<CommentConnection>,
}

#[derive(Debug, Deserialize)]
pub struct CommentConnection {
    #[serde(default)]
    pub nodes: Vec<Option<Comment>>,
}

impl CommentsData {
    /// Comments in the order the server returned them, skipping null nodes
    pub fn into_comments(self) -> Vec<Comment> {
        self.repository
            .and_then(|r| r.issue_or_pull_request)
            .and_then(|i| i.comments)
            .map(|c| c.nodes.into_iter().flatten().collect())
            .unwrap_or_default()
    }
}
