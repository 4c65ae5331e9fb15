use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::models::IssueState;

/// The role a user plays on the pull requests being searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    Author,
    Commenter,
    Assignee,
    Mentions,
    Involves,
}

impl SearchType {
    pub fn qualifier(&self) -> &'static str {
        match self {
            SearchType::Author => "author",
            SearchType::Commenter => "commenter",
            SearchType::Assignee => "assignee",
            SearchType::Mentions => "mentions",
            SearchType::Involves => "involves",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualifier())
    }
}

impl FromStr for SearchType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "author" => Ok(SearchType::Author),
            "commenter" => Ok(SearchType::Commenter),
            "assignee" => Ok(SearchType::Assignee),
            "mentions" => Ok(SearchType::Mentions),
            "involves" => Ok(SearchType::Involves),
            _ => Err(Error::UnknownSearchType(s.to_string())),
        }
    }
}

/// A pull request search in one repository, created strictly after a cutoff,
/// sorted by creation time ascending.
#[derive(Debug, Clone)]
pub struct SearchIssuesRequest {
    pub repo: String,
    pub login: String,
    pub search_type: SearchType,
    pub created_after: DateTime<Utc>,
    pub state: Option<IssueState>,
}

impl SearchIssuesRequest {
    pub fn new(
        repo: &str,
        login: &str,
        search_type: SearchType,
        created_after: DateTime<Utc>,
    ) -> Self {
        Self {
            repo: repo.to_string(),
            login: login.to_string(),
            search_type,
            created_after,
            state: None,
        }
    }

    /// Window of `days_back` days ending at `now`.
    pub fn within_days(
        repo: &str,
        login: &str,
        search_type: SearchType,
        days_back: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(repo, login, search_type, now - Duration::days(days_back as i64))
    }

    pub fn with_state(mut self, state: Option<IssueState>) -> Self {
        self.state = state;
        self
    }

    /// The `q` parameter of the search call.
    pub fn query(&self) -> String {
        let mut terms = vec![
            format!("repo:{}", self.repo),
            "is:pr".to_string(),
            format!(
                "created:>{}",
                self.created_after.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            format!("{}:{}", self.search_type.qualifier(), self.login),
        ];
        if let Some(state) = self.state {
            terms.push(format!("state:{}", state));
        }
        terms.join(" ")
    }

    pub fn sort(&self) -> &'static str {
        "created"
    }

    pub fn order(&self) -> &'static str {
        "asc"
    }
}
