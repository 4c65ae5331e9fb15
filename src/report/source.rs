use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::github::{SearchIssuesRequest, SearchType};
use crate::models::{IssueState, SearchIssuesResult, TeamMember};

/// Where the report gets team membership and pull request searches from.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn team_members(&self, team_id: u64) -> Result<Vec<TeamMember>>;
    async fn search_pull_requests(
        &self,
        request: &SearchIssuesRequest,
    ) -> Result<SearchIssuesResult>;
}

/// Members of the configured team; no team means an empty report.
pub async fn get_all_team_members<S>(source: &S, team_id: Option<u64>) -> Result<Vec<TeamMember>>
where
    S: PullRequestSource + ?Sized,
{
    match team_id {
        Some(team_id) => source.team_members(team_id).await,
        None => Ok(Vec::new()),
    }
}

/// Pull requests in `repo` created in the last `days_back` days where `login`
/// has the given role.
pub async fn get_prs<S>(
    source: &S,
    repo: &str,
    login: &str,
    days_back: u32,
    search_type: SearchType,
    state: Option<IssueState>,
    now: DateTime<Utc>,
) -> Result<SearchIssuesResult>
where
    S: PullRequestSource + ?Sized,
{
    let request = SearchIssuesRequest::within_days(repo, login, search_type, days_back, now)
        .with_state(state);
    tracing::debug!("Query: {}", request.query());
    source.search_pull_requests(&request).await
}
