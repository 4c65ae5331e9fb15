use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::search::SearchIssuesRequest;
use crate::models::SearchIssuesResult;

/// The search API never returns more than this many results for one query.
pub const SEARCH_RESULT_CAP: usize = 1000;

pub struct Paginator<'a> {
    client: &'a GitHubClient,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Follows a list endpoint page by page until the `Link` header has no
    /// `next` relation.
    pub async fn fetch_all<T: DeserializeOwned>(&self, url: &str, per_page: u32) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            tracing::debug!("Fetching: {} (page {})", url, page);
            let response = self
                .client
                .get(url, &[("per_page", per_page.to_string()), ("page", page.to_string())])
                .await?;

            let has_next = has_next_page(response.headers());
            let items: Vec<T> = response.json().await?;
            let items_count = items.len();
            all_items.extend(items);

            if !has_next || items_count < per_page as usize {
                break;
            }

            page += 1;
        }

        Ok(all_items)
    }

    /// Collects every page of an issue search, up to the search result cap.
    pub async fn fetch_search(
        &self,
        url: &str,
        request: &SearchIssuesRequest,
        per_page: u32,
    ) -> Result<SearchIssuesResult> {
        let mut result = SearchIssuesResult::default();
        let mut page = 1;
        let query = request.query();

        loop {
            tracing::debug!("Searching: {} (page {})", query, page);
            let response = self
                .client
                .get(
                    url,
                    &[
                        ("q", query.clone()),
                        ("sort", request.sort().to_string()),
                        ("order", request.order().to_string()),
                        ("per_page", per_page.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;

            let has_next = has_next_page(response.headers());
            let body: SearchIssuesResult = response.json().await?;
            let items_count = body.items.len();
            result.total_count = body.total_count;
            result.incomplete_results |= body.incomplete_results;
            result.items.extend(body.items);

            if search_done(
                result.items.len(),
                items_count,
                per_page,
                result.total_count,
                has_next,
            ) {
                break;
            }

            page += 1;
        }

        if (result.items.len() as u64) < result.total_count {
            tracing::warn!(
                "Search returned {} of {} results for: {}",
                result.items.len(),
                result.total_count,
                query
            );
        }

        Ok(result)
    }
}

/// Whether a search needs no further pages: no `next` link, an empty or
/// short page, the total count reached, or the search result cap hit.
pub fn search_done(
    collected: usize,
    page_len: usize,
    per_page: u32,
    total_count: u64,
    has_next: bool,
) -> bool {
    !has_next
        || page_len < per_page as usize
        || collected as u64 >= total_count
        || collected >= SEARCH_RESULT_CAP
}

pub fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get("link")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("rel=\"next\""))
        .unwrap_or(false)
}
