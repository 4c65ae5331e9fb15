use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::{RateLimitInfo, RateLimitTracker};
use crate::github::search::SearchIssuesRequest;
use crate::models::{GitHubUser, SearchIssuesResult, Team, TeamMember};
use crate::report::PullRequestSource;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_APP_NAME: &str = "team-pr-stats";
const PER_PAGE: u32 = 100;

pub struct GitHubClient {
    client: Client,
    user: String,
    api_key: String,
    rate_limiter: RateLimitTracker,
    base_url: String,
}

impl GitHubClient {
    /// Builds a client authenticated with the configured user and API key.
    pub fn new(config: &Config) -> Result<Self> {
        let user = non_empty(config.user.as_deref())
            .ok_or_else(|| Error::Config("GitHub user is not configured".to_string()))?;
        let api_key = non_empty(config.api_key.as_deref())
            .ok_or_else(|| Error::Config("GitHub API key is not configured".to_string()))?;
        let app_name = non_empty(config.app_name.as_deref()).unwrap_or(DEFAULT_APP_NAME);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(header::USER_AGENT, header::HeaderValue::from_str(app_name)?);

        let client = Client::builder().default_headers(headers).build()?;

        let base_url = non_empty(config.url_root.as_deref())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            user: user.to_string(),
            api_key: api_key.to_string(),
            rate_limiter: RateLimitTracker::new(),
            base_url,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.user, Some(&self.api_key))
            .query(query)
            .send()
            .await?;
        self.rate_limiter.update_from_headers(response.headers());

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(info) = RateLimitInfo::from_headers(response.headers()) {
                if info.is_exhausted() {
                    let reset = info.reset.map(|r| r.timestamp().max(0) as u64).unwrap_or(0);
                    return Err(Error::RateLimited(reset));
                }
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::GitHubApi(format!("GET {} failed: {} - {}", url, status, body)))
    }

    pub async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        let url = format!("{}/users/{}", self.base_url, login);
        tracing::info!("Fetching user: {}", login);
        Ok(self.get(&url, &[]).await?.json().await?)
    }

    /// Rate-limit snapshot taken from the most recent response.
    pub fn last_rate_limit(&self) -> Option<RateLimitInfo> {
        self.rate_limiter.last()
    }

    pub async fn get_org_teams(&self, org: &str) -> Result<Vec<Team>> {
        let url = format!("{}/orgs/{}/teams", self.base_url, org);
        tracing::info!("Fetching teams for: {}", org);
        Paginator::new(self).fetch_all(&url, PER_PAGE).await
    }

    /// Id of the first team in `org` whose name is exactly `team_name`.
    pub async fn get_team_id(&self, org: &str, team_name: &str) -> Result<Option<u64>> {
        let teams = self.get_org_teams(org).await?;
        Ok(find_team_id(&teams, team_name))
    }

    /// Like `get_team_id`, but a name matching no team is an error.
    pub async fn require_team_id(&self, org: &str, team_name: &str) -> Result<u64> {
        let teams = self.get_org_teams(org).await?;
        resolve_team_id(&teams, team_name)
    }

    pub async fn get_team_members(&self, team_id: u64) -> Result<Vec<TeamMember>> {
        let url = format!("{}/teams/{}/members", self.base_url, team_id);
        tracing::info!("Fetching members of team {}", team_id);
        Paginator::new(self).fetch_all(&url, PER_PAGE).await
    }

    pub async fn search_issues(&self, request: &SearchIssuesRequest) -> Result<SearchIssuesResult> {
        let url = format!("{}/search/issues", self.base_url);
        Paginator::new(self)
            .fetch_search(&url, request, PER_PAGE)
            .await
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn team_members(&self, team_id: u64) -> Result<Vec<TeamMember>> {
        self.get_team_members(team_id).await
    }

    async fn search_pull_requests(
        &self,
        request: &SearchIssuesRequest,
    ) -> Result<SearchIssuesResult> {
        self.search_issues(request).await
    }
}

pub fn find_team_id(teams: &[Team], team_name: &str) -> Option<u64> {
    teams.iter().find(|t| t.name == team_name).map(|t| t.id)
}

pub fn resolve_team_id(teams: &[Team], team_name: &str) -> Result<u64> {
    find_team_id(teams, team_name).ok_or_else(|| Error::TeamNotFound(team_name.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
