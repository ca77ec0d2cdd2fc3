use regex::Regex;

use crate::error::ConfigError;
use crate::github::types::Comment;

/// Which issue to look at and what the comment body must match
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    pub issue_number: u64,
    pub pattern: Regex,
}

impl SelectionCriteria {
    pub fn new(issue_number: u64, pattern: &str) -> Result<Self, ConfigError> {
        if issue_number == 0 || pattern.is_empty() {
            return Err(ConfigError::MissingFlags);
        }
        // GraphQL Int is a signed 32-bit value
        if issue_number > i32::MAX as u64 {
            return Err(ConfigError::IssueOutOfRange(issue_number));
        }

        Ok(Self {
            issue_number,
            pattern: Regex::new(pattern)?,
        })
    }

    /// First comment written by the viewer whose body matches, in the order given
    pub fn select<'a>(&self, comments: &'a [Comment]) -> Option<&'a Comment> {
        comments
            .iter()
            .find(|c| c.viewer_did_author && self.pattern.is_match(&c.body))
    }
}
