use chrono::{DateTime, SecondsFormat, Utc};

use super::issue::{IssueItem, IssueState};

pub const CSV_HEADER: &str = "type,creator,reviewer,state,daysopen,title,created,updated,comments";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Created,
    Reviewed,
}

impl Role {
    pub fn tag(&self) -> char {
        match self {
            Role::Created => 'C',
            Role::Reviewed => 'R',
        }
    }
}

/// A pull request as it appears in the report, for one role of one member.
#[derive(Debug, Clone)]
pub struct PullRequestRecord {
    pub role: Role,
    pub creator: String,
    pub reviewer: String,
    pub state: IssueState,
    pub days_open: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: u32,
}

impl PullRequestRecord {
    pub fn created(item: &IssueItem, now: DateTime<Utc>) -> Self {
        Self::from_item(item, Role::Created, String::new(), now)
    }

    pub fn reviewed(item: &IssueItem, reviewer: &str, now: DateTime<Utc>) -> Self {
        Self::from_item(item, Role::Reviewed, reviewer.to_string(), now)
    }

    fn from_item(item: &IssueItem, role: Role, reviewer: String, now: DateTime<Utc>) -> Self {
        Self {
            role,
            creator: item.author().to_string(),
            reviewer,
            state: item.state,
            days_open: age_in_days(item, now),
            title: strip_commas(&item.title),
            created_at: item.created_at,
            updated_at: item.updated_at,
            comments: item.comments,
        }
    }

    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.role.tag(),
            self.creator,
            self.reviewer,
            self.state,
            self.days_open,
            self.title,
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.comments
        )
    }

    /// "Open N days" or "Closed in N days".
    pub fn age_phrase(&self) -> String {
        match self.state {
            IssueState::Open => format!("Open {} days", self.days_open),
            IssueState::Closed => format!("Closed in {} days", self.days_open),
        }
    }
}

/// Whole days the item has been open (open items) or took to close (closed
/// items), rounded to the nearest day. Closed items without a close stamp
/// count as 0.
pub fn age_in_days(item: &IssueItem, now: DateTime<Utc>) -> i64 {
    let end = match item.state {
        IssueState::Open => now,
        IssueState::Closed => match item.closed_at {
            Some(closed_at) => closed_at,
            None => return 0,
        },
    };
    let seconds = (end - item.created_at).num_seconds() as f64;
    ((seconds / 86_400.0).round() as i64).max(0)
}

pub fn strip_commas(title: &str) -> String {
    title.replace(',', "")
}
