use std::process::Command;

use tracing::debug;

use super::types::DEFAULT_HOST;
use crate::error::ApiError;

/// Get a token for `host`, prioritizing `gh auth token` for SSO compatibility
#[allow(clippy::collapsible_if)]
pub fn get_token(host: &str) -> Result<String, ApiError> {
    if let Ok(output) = Command::new("gh")
        .args(["auth", "token", "--hostname", host])
        .output()
    {
        if output.status.success() {
            let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !token.is_empty() {
                debug!(host, "using token from `gh auth token`");
                return Ok(token);
            }
        }
    }

    token_from_env(host, |key| std::env::var(key).ok()).ok_or_else(|| ApiError::NoToken {
        host: host.to_string(),
    })
}

/// Environment variables the gh CLI consults, in priority order
fn token_vars(host: &str) -> [&'static str; 2] {
    if host == DEFAULT_HOST {
        ["GH_TOKEN", "GITHUB_TOKEN"]
    } else {
        ["GH_ENTERPRISE_TOKEN", "GITHUB_ENTERPRISE_TOKEN"]
    }
}

fn token_from_env(host: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    token_vars(host).into_iter().find_map(|key| {
        let token = lookup(key)?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            debug!(host, source = key, "using token from environment");
            Some(token.to_string())
        }
    })
}
