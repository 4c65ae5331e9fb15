pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod report;

pub use config::{Config, ReportConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use report::{PullRequestSource, ReportBuilder, ReportSummary};
