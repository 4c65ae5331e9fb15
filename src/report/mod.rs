pub mod builder;
pub mod rate_status;
pub mod source;

pub use builder::{ReportBuilder, ReportSummary};
pub use rate_status::print_rate_status;
pub use source::{get_all_team_members, get_prs, PullRequestSource};
