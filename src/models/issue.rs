use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAuthor {
    pub login: String,
}

/// One item of an issue search; with `is:pr` every item is a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueItem {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub user: IssueAuthor,
    pub html_url: String,
    #[serde(default)]
    pub comments: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl IssueItem {
    pub fn author(&self) -> &str {
        &self.user.login
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchIssuesResult {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<IssueItem>,
}

pub fn count_open(items: &[IssueItem]) -> usize {
    items.iter().filter(|i| i.is_open()).count()
}
