use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::ConfigError;
use crate::github::client::{CommentApi, GitHubClient};
use crate::github::repo;
use crate::github::types::{RepoRef, UpdateRequest};
use crate::select::SelectionCriteria;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Updated { comment_id: String },
    NoMatch,
}

pub async fn run(issue: u64, regexp: &str, body: &str, repo_override: Option<&str>) -> Result<()> {
    if body.is_empty() {
        return Err(ConfigError::MissingFlags.into());
    }
    let criteria = SelectionCriteria::new(issue, regexp)?;

    let repo = repo::resolve(repo_override).context("could not determine what repo to use")?;
    let client = GitHubClient::new(&repo).context("could not create a graphql client")?;

    let outcome = apply(&client, &repo, &criteria, body).await?;
    report(&outcome, &mut std::io::stderr())?;

    Ok(())
}

/// Tell the user how the run ended. A successful update prints nothing.
pub fn report(outcome: &Outcome, out: &mut impl Write) -> std::io::Result<()> {
    match outcome {
        Outcome::Updated { comment_id } => {
            info!(%comment_id, "comment updated");
            Ok(())
        }
        Outcome::NoMatch => writeln!(out, "No matching comment found."),
    }
}

/// Fetch, select and, when something matched, replace the comment body
pub async fn apply<A: CommentApi>(
    api: &A,
    repo: &RepoRef,
    criteria: &SelectionCriteria,
    body: &str,
) -> Result<Outcome> {
    let comments = api
        .fetch_comments(repo, criteria.issue_number)
        .await
        .context("failed to talk to the GitHub API")?;

    let Some(comment) = criteria.select(&comments) else {
        info!(%repo, issue = criteria.issue_number, "no matching comment");
        return Ok(Outcome::NoMatch);
    };

    let request = UpdateRequest {
        comment_id: comment.id.clone(),
        new_body: body.to_string(),
    };
    api.update_comment(&request)
        .await
        .context("failed to mutate comment")?;

    Ok(Outcome::Updated {
        comment_id: request.comment_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::github::types::Comment;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        comments: Vec<Comment>,
        fail_fetch: bool,
        fail_update: bool,
        fetched: Mutex<Vec<(RepoRef, u64)>>,
        updates: Mutex<Vec<UpdateRequest>>,
    }

    impl FakeApi {
        fn with_comments(comments: Vec<Comment>) -> Self {
            Self {
                comments,
                ..Default::default()
            }
        }
    }

    impl CommentApi for FakeApi {
        async fn fetch_comments(
            &self,
            repo: &RepoRef,
            number: u64,
        ) -> Result<Vec<Comment>, ApiError> {
            self.fetched.lock().unwrap().push((repo.clone(), number));
            if self.fail_fetch {
                return Err(ApiError::GraphQl(vec!["Bad credentials".to_string()]));
            }
            Ok(self.comments.clone())
        }

        async fn update_comment(&self, request: &UpdateRequest) -> Result<(), ApiError> {
            if self.fail_update {
                return Err(ApiError::GraphQl(vec!["Resource not accessible".to_string()]));
            }
            self.updates.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn comment(id: &str, authored: bool, body: &str) -> Comment {
        Comment {
            id: id.to_string(),
            body: body.to_string(),
            viewer_did_author: authored,
        }
    }

    fn repo() -> RepoRef {
        RepoRef::new("octocat", "hello-world")
    }

    #[tokio::test]
    async fn updates_first_authored_match() {
        let api = FakeApi::with_comments(vec![
            comment("A", false, "foo123"),
            comment("B", true, "foo123"),
            comment("C", true, "foo999"),
        ]);
        let criteria = SelectionCriteria::new(12, r"foo\d+").unwrap();

        let outcome = apply(&api, &repo(), &criteria, "replaced").await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Updated {
                comment_id: "B".to_string()
            }
        );
        assert_eq!(*api.fetched.lock().unwrap(), vec![(repo(), 12)]);
        assert_eq!(
            *api.updates.lock().unwrap(),
            vec![UpdateRequest {
                comment_id: "B".to_string(),
                new_body: "replaced".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn no_match_skips_mutation() {
        let api = FakeApi::with_comments(vec![comment("A", false, "foo123")]);
        let criteria = SelectionCriteria::new(3, "foo").unwrap();

        let outcome = apply(&api, &repo(), &criteria, "replaced").await.unwrap();

        assert_eq!(outcome, Outcome::NoMatch);
        assert!(api.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_api_error() {
        let api = FakeApi {
            fail_fetch: true,
            ..Default::default()
        };
        let criteria = SelectionCriteria::new(3, "foo").unwrap();

        let err = apply(&api, &repo(), &criteria, "replaced")
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<ApiError>().is_some());
        assert_eq!(
            format!("{err:#}"),
            "failed to talk to the GitHub API: Bad credentials"
        );
        assert!(api.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_failure_is_api_error() {
        let api = FakeApi {
            comments: vec![comment("A", true, "foo")],
            fail_update: true,
            ..Default::default()
        };
        let criteria = SelectionCriteria::new(3, "foo").unwrap();

        let err = apply(&api, &repo(), &criteria, "replaced")
            .await
            .unwrap_err();

        assert_eq!(
            format!("{err:#}"),
            "failed to mutate comment: Resource not accessible"
        );
    }

    mod report {
        use super::*;

        fn rendered(outcome: &Outcome) -> String {
            let mut out = Vec::new();
            super::super::report(outcome, &mut out).unwrap();
            String::from_utf8(out).unwrap()
        }

        #[test]
        fn no_match_prints_one_line() {
            assert_eq!(rendered(&Outcome::NoMatch), "No matching comment found.\n");
        }

        #[test]
        fn update_prints_nothing() {
            let outcome = Outcome::Updated {
                comment_id: "IC_a".to_string(),
            };
            assert_eq!(rendered(&outcome), "");
        }

        #[tokio::test]
        async fn matched_run_is_silent() {
            let api = FakeApi::with_comments(vec![comment("A", true, "status: pending")]);
            let criteria = SelectionCriteria::new(5, "^status:").unwrap();

            let outcome = apply(&api, &repo(), &criteria, "status: done").await.unwrap();

            assert_eq!(rendered(&outcome), "");
            assert_eq!(api.updates.lock().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn unmatched_run_reports_no_match() {
            let api = FakeApi::with_comments(vec![comment("A", false, "status: pending")]);
            let criteria = SelectionCriteria::new(5, "^status:").unwrap();

            let outcome = apply(&api, &repo(), &criteria, "status: done").await.unwrap();

            assert_eq!(rendered(&outcome), "No matching comment found.\n");
            assert!(api.updates.lock().unwrap().is_empty());
        }
    }

    mod run {
        use super::*;

        #[tokio::test]
        async fn empty_body_is_rejected() {
            let err = super::super::run(1, "foo", "", Some("octocat/hello-world"))
                .await
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ConfigError>(),
                Some(ConfigError::MissingFlags)
            ));
        }

        #[tokio::test]
        async fn zero_issue_is_rejected() {
            let err = super::super::run(0, "foo", "text", Some("octocat/hello-world"))
                .await
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ConfigError>(),
                Some(ConfigError::MissingFlags)
            ));
        }

        #[tokio::test]
        async fn malformed_repo_fails_before_any_request() {
            let err = super::super::run(1, "foo", "text", Some("no-slash"))
                .await
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ConfigError>(),
                Some(ConfigError::RepoFormat(_))
            ));
            assert!(
                format!("{err:#}").starts_with("could not determine what repo to use: ")
            );
        }
    }
}
