use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::types::{DEFAULT_HOST, RepoRef, normalize_host};
use crate::error::ConfigError;

static SCP_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([^@/]+)@)?([^:/]+):(.+)$").expect("scp remote pattern is valid")
});

/// A git remote's fetch URL
#[derive(Debug, Clone, PartialEq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

/// Resolve the target repository from an explicit override, falling back to
/// the git remotes of the current directory.
pub fn resolve(repo_override: Option<&str>) -> Result<RepoRef, ConfigError> {
    match repo_override.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_repo(raw),
        None => current_repository(),
    }
}

/// Parse `OWNER/REPO`, `HOST/OWNER/REPO` or a repository URL
pub fn parse_repo(raw: &str) -> Result<RepoRef, ConfigError> {
    parse_repo_with_host(raw, &default_host())
}

/// Like [`parse_repo`], with `default_host` used for `OWNER/REPO`
pub fn parse_repo_with_host(raw: &str, default_host: &str) -> Result<RepoRef, ConfigError> {
    let invalid = || ConfigError::RepoFormat(raw.to_string());

    if raw.contains("://") {
        let url = Url::parse(raw).map_err(|_| invalid())?;
        return repo_from_url(&url).ok_or_else(invalid);
    }

    let parts: Vec<&str> = raw.split('/').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid());
    }

    match parts.as_slice() {
        [owner, name] => Ok(RepoRef::with_host(default_host, owner, name)),
        [host, owner, name] => Ok(RepoRef::with_host(host, owner, name)),
        _ => Err(invalid()),
    }
}

fn current_repository() -> Result<RepoRef, ConfigError> {
    let output = Command::new("git")
        .args(["remote", "-v"])
        .output()
        .map_err(|e| ConfigError::NoCurrentRepo(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        return Err(ConfigError::NoCurrentRepo(format!(
            "failed to list git remotes: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let remotes = parse_remotes(&String::from_utf8_lossy(&output.stdout));
    if remotes.is_empty() {
        return Err(ConfigError::NoCurrentRepo(
            "no git remotes found".to_string(),
        ));
    }

    let repo = select_remote(&remotes, &known_hosts()).ok_or_else(|| {
        ConfigError::NoCurrentRepo(
            "none of the git remotes configured for this repository point to a known GitHub host"
                .to_string(),
        )
    })?;
    debug!(%repo, "resolved repository from git remotes");
    Ok(repo)
}

/// `GH_HOST` when set, otherwise github.com
fn default_host() -> String {
    std::env::var("GH_HOST")
        .ok()
        .map(|host| normalize_host(host.trim()))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}

fn known_hosts() -> Vec<String> {
    let mut hosts = vec![DEFAULT_HOST.to_string()];
    let host = default_host();
    if !hosts.contains(&host) {
        hosts.push(host);
    }
    hosts
}

/// Parse `git remote -v` output, keeping fetch URLs in listed order
pub fn parse_remotes(output: &str) -> Vec<Remote> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let url = fields.next()?;
            match fields.next() {
                Some("(fetch)") | None => Some(Remote {
                    name: name.to_string(),
                    url: url.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

fn remote_rank(name: &str) -> u8 {
    match name {
        "upstream" => 3,
        "github" => 2,
        "origin" => 1,
        _ => 0,
    }
}

/// Pick the highest ranked remote that points at a known host
pub fn select_remote(remotes: &[Remote], known_hosts: &[String]) -> Option<RepoRef> {
    let mut ranked: Vec<&Remote> = remotes.iter().collect();
    // stable: equal ranks keep git's order
    ranked.sort_by_key(|r| std::cmp::Reverse(remote_rank(&r.name)));

    ranked.into_iter().find_map(|remote| {
        let repo = parse_remote_url(&remote.url)?;
        known_hosts.contains(&repo.host).then_some(repo)
    })
}

/// Parse a remote URL, including scp-like `git@host:owner/repo.git`
pub fn parse_remote_url(raw: &str) -> Option<RepoRef> {
    if raw.contains("://") {
        return repo_from_url(&Url::parse(raw).ok()?);
    }

    let caps = SCP_REMOTE.captures(raw)?;
    let user = caps.get(1).map(|m| format!("{}@", m.as_str())).unwrap_or_default();
    let path = caps[3].trim_start_matches('/');
    let url = Url::parse(&format!("ssh://{}{}/{}", user, &caps[2], path)).ok()?;
    repo_from_url(&url)
}

fn repo_from_url(url: &Url) -> Option<RepoRef> {
    let host = url.host_str()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let &[owner, name] = segments.as_slice() else {
        return None;
    };
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
        return None;
    }
    Some(RepoRef::with_host(host, owner, name))
}
