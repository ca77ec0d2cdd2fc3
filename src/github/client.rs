use serde::de::DeserializeOwned;
use tracing::debug;

use super::auth::get_token;
use super::types::{
    Comment, CommentsData, GraphQlRequest, GraphQlResponse, RepoRef, UpdateRequest,
};
use crate::error::ApiError;

const USER_AGENT: &str = "gh-comment-update";

const COMMENTS_QUERY: &str = r#"query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issueOrPullRequest(number: $number) {
      ... on Issue {
        comments(first: 100) {
          nodes { id body viewerDidAuthor }
        }
      }
      ... on PullRequest {
        comments(first: 100) {
          nodes { id body viewerDidAuthor }
        }
      }
    }
  }
}"#;

const UPDATE_MUTATION: &str = r#"mutation gh_comment_update($input: UpdateIssueCommentInput!) {
  updateIssueComment(input: $input) { clientMutationId }
}"#;

/// Read and write access to issue/PR comments
#[allow(async_fn_in_trait)]
pub trait CommentApi {
    /// First 100 comments on an issue or pull request, in server order
    async fn fetch_comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<Comment>, ApiError>;

    async fn update_comment(&self, request: &UpdateRequest) -> Result<(), ApiError>;
}

/// GitHub GraphQL API client
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GitHubClient {
    /// Create a client authenticated for the repository's host
    pub fn new(repo: &RepoRef) -> Result<Self, ApiError> {
        let token = get_token(&repo.host)?;
        Ok(Self::with_endpoint(repo.graphql_url(), token))
    }

    pub fn with_endpoint(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        debug!(endpoint = %self.endpoint, "sending GraphQL request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let payload: GraphQlResponse<T> = response.json().await?;

        if let Some(errors) = payload.errors.filter(|e| !e.is_empty()) {
            return Err(ApiError::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        payload.data.ok_or(ApiError::EmptyResponse)
    }
}

impl CommentApi for GitHubClient {
    async fn fetch_comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<Comment>, ApiError> {
        let data: CommentsData = self
            .execute(
                COMMENTS_QUERY,
                serde_json::json!({
                    "owner": repo.owner,
                    "name": repo.name,
                    "number": number,
                }),
            )
            .await?;

        let comments = data.into_comments();
        debug!(%repo, number, count = comments.len(), "fetched comments");
        Ok(comments)
    }

    async fn update_comment(&self, request: &UpdateRequest) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .execute(UPDATE_MUTATION, serde_json::json!({ "input": request }))
            .await?;

        debug!(comment_id = %request.comment_id, "updated comment");
        Ok(())
    }
}
