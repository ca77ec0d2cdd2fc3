use thiserror::Error;

/// Problems with the invocation itself, detected before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("issue, regexp and body flags are required")]
    MissingFlags,

    #[error("issue number {0} is out of range")]
    IssueOutOfRange(u64),

    #[error("invalid regexp: {0}")]
    Pattern(#[from] regex::Error),

    #[error("expected the \"[HOST/]OWNER/REPO\" format, got {0:?}")]
    RepoFormat(String),

    #[error("{0}")]
    NoCurrentRepo(String),
}

/// Failures talking to the GitHub API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(
        "no GitHub token found for {host}; run `gh auth login` or set the GH_TOKEN environment variable"
    )]
    NoToken { host: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("response contained no data")]
    EmptyResponse,
}
