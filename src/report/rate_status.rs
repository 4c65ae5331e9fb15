use crate::error::Result;
use crate::github::{GitHubClient, RateLimitInfo};

/// Makes one user lookup and prints the rate-limit status reported with it.
pub async fn print_rate_status(client: &GitHubClient) -> Result<Option<RateLimitInfo>> {
    client.get_user(client.user()).await?;
    let info = client.last_rate_limit();
    println!("{}", rate_status_line(info.as_ref()));
    Ok(info)
}

pub fn rate_status_line(info: Option<&RateLimitInfo>) -> String {
    match info {
        Some(info) => info.to_string(),
        None => RateLimitInfo {
            limit: None,
            remaining: None,
            reset: None,
        }
        .to_string(),
    }
}
