pub mod client;
pub mod rate_limiter;
pub mod paginator;
pub mod search;

pub use client::GitHubClient;
pub use rate_limiter::{RateLimitInfo, RateLimitTracker};
pub use paginator::Paginator;
pub use search::{SearchIssuesRequest, SearchType};
