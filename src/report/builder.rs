use chrono::{DateTime, Local, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::ReportConfig;
use crate::error::Result;
use crate::github::SearchType;
use crate::models::{count_open, IssueItem, PullRequestRecord, TeamMember, CSV_HEADER};
use crate::report::source::{get_all_team_members, get_prs, PullRequestSource};

const SEPARATOR_WIDTH: usize = 80;

/// Row counts of one report run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub members: usize,
    pub created: usize,
    pub reviewed: usize,
}

pub struct ReportBuilder<S> {
    source: S,
    config: ReportConfig,
}

impl<S: PullRequestSource> ReportBuilder<S> {
    pub fn new(source: S, config: ReportConfig) -> Self {
        Self { source, config }
    }

    /// Writes `{name}.txt` and `{name}.csv` into `output_dir`, replacing any
    /// previous report with the same name.
    pub async fn generate(&self, output_dir: &Path) -> Result<ReportSummary> {
        let text_path = output_dir.join(format!("{}.txt", self.config.output_file_name));
        let csv_path = output_dir.join(format!("{}.csv", self.config.output_file_name));

        let mut csv = BufWriter::new(File::create(&csv_path)?);
        let mut text = BufWriter::new(File::create(&text_path)?);

        let summary = self.write_report(&mut text, &mut csv, Utc::now()).await?;
        text.flush()?;
        csv.flush()?;

        tracing::info!(
            "Report written to {} and {}",
            text_path.display(),
            csv_path.display()
        );
        Ok(summary)
    }

    /// Streams the text report as members are processed; CSV rows are held
    /// back so all created rows precede all reviewed rows.
    pub async fn write_report<T, C>(
        &self,
        text: &mut T,
        csv: &mut C,
        now: DateTime<Utc>,
    ) -> Result<ReportSummary>
    where
        T: Write,
        C: Write,
    {
        let stamp = now.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string();
        let window = format!(
            "Output For PR review for the last {} days...",
            self.config.days_back
        );
        writeln!(text, "{}", stamp)?;
        writeln!(text, "{}", window)?;
        writeln!(csv, "{}", stamp)?;
        writeln!(csv, "{}", window)?;

        let members = get_all_team_members(&self.source, self.config.team_id).await?;
        tracing::info!("Reporting on {} team members", members.len());

        let pb = ProgressBar::new(members.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} members {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut created_rows = Vec::new();
        let mut reviewed_rows = Vec::new();

        for member in &members {
            pb.set_message(member.login.clone());
            self.write_member(text, member, now, &mut created_rows, &mut reviewed_rows)
                .await?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        writeln!(csv, "{}", CSV_HEADER)?;
        for row in created_rows.iter().chain(reviewed_rows.iter()) {
            writeln!(csv, "{}", row.csv_row())?;
        }

        Ok(ReportSummary {
            members: members.len(),
            created: created_rows.len(),
            reviewed: reviewed_rows.len(),
        })
    }

    async fn write_member<T: Write>(
        &self,
        text: &mut T,
        member: &TeamMember,
        now: DateTime<Utc>,
        created_rows: &mut Vec<PullRequestRecord>,
        reviewed_rows: &mut Vec<PullRequestRecord>,
    ) -> Result<()> {
        let dashes = "-".repeat(SEPARATOR_WIDTH);
        let login = member.login.as_str();

        writeln!(text, "{}", dashes)?;
        writeln!(text, "Team Member {}", login)?;

        let authored = self.query(login, SearchType::Author, now).await?;
        if !authored.is_empty() {
            let open = count_open(&authored);
            writeln!(
                text,
                "{}: {} created ({} open / {} closed)",
                login,
                authored.len(),
                open,
                authored.len() - open
            )?;
            for item in &authored {
                writeln!(text, "\t{}: {} - {}", item.author(), item.title, item.state)?;
                created_rows.push(PullRequestRecord::created(item, now));
            }
            writeln!(text)?;
        }

        // Commenting on your own pull request is not a review.
        let reviewed: Vec<IssueItem> = self
            .query(login, SearchType::Commenter, now)
            .await?
            .into_iter()
            .filter(|item| item.author() != login)
            .collect();
        if !reviewed.is_empty() {
            let open = count_open(&reviewed);
            writeln!(
                text,
                "{}: {} reviewed ({} open / {} closed)",
                login,
                reviewed.len(),
                open,
                reviewed.len() - open
            )?;
            for item in &reviewed {
                let record = PullRequestRecord::reviewed(item, login, now);
                writeln!(
                    text,
                    "\t{}: {} - {} ({})",
                    item.author(),
                    item.title,
                    item.state,
                    record.age_phrase()
                )?;
                reviewed_rows.push(record);
            }
            writeln!(text, "{}", dashes)?;
            writeln!(text)?;
        }

        tracing::debug!(
            "{}: {} created, {} reviewed",
            login,
            authored.len(),
            reviewed.len()
        );
        Ok(())
    }

    async fn query(
        &self,
        login: &str,
        search_type: SearchType,
        now: DateTime<Utc>,
    ) -> Result<Vec<IssueItem>> {
        let result = get_prs(
            &self.source,
            &self.config.repo,
            login,
            self.config.days_back,
            search_type,
            None,
            now,
        )
        .await?;
        Ok(result.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::github::SearchIssuesRequest;
    use crate::models::{IssueAuthor, IssueState, SearchIssuesResult};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        members: Vec<TeamMember>,
        results: HashMap<(String, SearchType), Vec<IssueItem>>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_members(logins: &[&str]) -> Self {
            Self {
                members: logins
                    .iter()
                    .enumerate()
                    .map(|(i, login)| TeamMember {
                        id: i as u64 + 1,
                        login: login.to_string(),
                    })
                    .collect(),
                ..Default::default()
            }
        }

        fn add(&mut self, login: &str, search_type: SearchType, items: Vec<IssueItem>) {
            self.results.insert((login.to_string(), search_type), items);
        }
    }

    #[async_trait]
    impl PullRequestSource for FakeSource {
        async fn team_members(&self, _team_id: u64) -> Result<Vec<TeamMember>> {
            Ok(self.members.clone())
        }

        async fn search_pull_requests(
            &self,
            request: &SearchIssuesRequest,
        ) -> Result<SearchIssuesResult> {
            self.queries.lock().unwrap().push(request.query());
            let items = self
                .results
                .get(&(request.login.clone(), request.search_type))
                .cloned()
                .unwrap_or_default();
            Ok(SearchIssuesResult {
                total_count: items.len() as u64,
                incomplete_results: false,
                items,
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PullRequestSource for FailingSource {
        async fn team_members(&self, _team_id: u64) -> Result<Vec<TeamMember>> {
            Ok(vec![TeamMember {
                id: 1,
                login: "alice".to_string(),
            }])
        }

        async fn search_pull_requests(
            &self,
            _request: &SearchIssuesRequest,
        ) -> Result<SearchIssuesResult> {
            Err(Error::GitHubApi("401 Bad credentials".to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn pr(
        number: u64,
        author: &str,
        title: &str,
        created_days_ago: i64,
        closed_after_days: Option<i64>,
    ) -> IssueItem {
        let created_at = now() - Duration::days(created_days_ago);
        let closed_at = closed_after_days.map(|d| created_at + Duration::days(d));
        IssueItem {
            number,
            title: title.to_string(),
            state: if closed_at.is_some() {
                IssueState::Closed
            } else {
                IssueState::Open
            },
            user: IssueAuthor {
                login: author.to_string(),
            },
            html_url: format!("https://github.com/acme/widgets/pull/{}", number),
            comments: 1,
            created_at,
            updated_at: closed_at.unwrap_or(created_at),
            closed_at,
        }
    }

    fn config(team_id: Option<u64>) -> ReportConfig {
        ReportConfig {
            repo: "acme/widgets".to_string(),
            team_id,
            days_back: 14,
            output_file_name: "weekly".to_string(),
        }
    }

    async fn run<S: PullRequestSource>(
        builder: &ReportBuilder<S>,
    ) -> (ReportSummary, Vec<String>, Vec<String>) {
        let mut text = Vec::new();
        let mut csv = Vec::new();
        let summary = builder.write_report(&mut text, &mut csv, now()).await.unwrap();
        let text = String::from_utf8(text).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        (
            summary,
            text.lines().map(str::to_string).collect(),
            csv.lines().map(str::to_string).collect(),
        )
    }

    #[tokio::test]
    async fn test_no_team_only_headers() {
        let builder = ReportBuilder::new(FakeSource::default(), config(None));
        let (summary, text, csv) = run(&builder).await;

        assert_eq!(summary, ReportSummary::default());
        assert_eq!(text.len(), 2);
        assert_eq!(text[1], "Output For PR review for the last 14 days...");
        assert_eq!(csv.len(), 3);
        assert_eq!(csv[1], text[1]);
        assert_eq!(csv[2], CSV_HEADER);
        assert!(builder.source.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authored_only_member() {
        let mut source = FakeSource::with_members(&["alice"]);
        source.add(
            "alice",
            SearchType::Author,
            vec![
                pr(1, "alice", "Add search, take two", 2, None),
                pr(2, "alice", "Fix flaky test", 10, Some(3)),
            ],
        );
        let builder = ReportBuilder::new(source, config(Some(9)));
        let (summary, text, csv) = run(&builder).await;

        assert_eq!(summary.created, 2);
        assert_eq!(summary.reviewed, 0);
        assert_eq!(
            &text[2..],
            &[
                "-".repeat(80),
                "Team Member alice".to_string(),
                "alice: 2 created (1 open / 1 closed)".to_string(),
                "\talice: Add search, take two - open".to_string(),
                "\talice: Fix flaky test - closed".to_string(),
                String::new(),
            ]
        );
        assert_eq!(csv.len(), 5);
        assert!(csv[3].starts_with("C,alice,,open,2,Add search take two,"));
        assert!(csv[4].starts_with("C,alice,,closed,3,Fix flaky test,"));
    }

    #[tokio::test]
    async fn test_self_comments_are_not_reviews() {
        let mut source = FakeSource::with_members(&["bob"]);
        source.add(
            "bob",
            SearchType::Commenter,
            vec![
                pr(3, "bob", "Bob's own change", 4, None),
                pr(4, "carol", "Carol's change", 5, Some(1)),
            ],
        );
        let builder = ReportBuilder::new(source, config(Some(9)));
        let (summary, text, csv) = run(&builder).await;

        assert_eq!(summary.reviewed, 1);
        assert_eq!(
            &text[4..],
            &[
                "bob: 1 reviewed (0 open / 1 closed)".to_string(),
                "\tcarol: Carol's change - closed (Closed in 1 days)".to_string(),
                "-".repeat(80),
                String::new(),
            ]
        );
        assert_eq!(csv.len(), 4);
        assert!(csv[3].starts_with("R,carol,bob,closed,1,"));
        assert!(!csv.iter().any(|row| row.contains("Bob's own change")));
    }

    #[tokio::test]
    async fn test_only_self_comments_writes_no_review_section() {
        let mut source = FakeSource::with_members(&["bob"]);
        source.add(
            "bob",
            SearchType::Commenter,
            vec![pr(3, "bob", "Bob's own change", 4, None)],
        );
        let builder = ReportBuilder::new(source, config(Some(9)));
        let (summary, text, csv) = run(&builder).await;

        assert_eq!(summary.reviewed, 0);
        assert_eq!(text.len(), 4);
        assert_eq!(text[3], "Team Member bob");
        assert_eq!(csv.len(), 3);
    }

    #[tokio::test]
    async fn test_created_rows_precede_reviewed_rows() {
        let mut source = FakeSource::with_members(&["alice", "bob"]);
        source.add("alice", SearchType::Author, vec![pr(1, "alice", "A1", 1, None)]);
        source.add("alice", SearchType::Commenter, vec![pr(2, "bob", "B1", 3, None)]);
        source.add("bob", SearchType::Author, vec![pr(2, "bob", "B1", 3, None)]);
        source.add("bob", SearchType::Commenter, vec![pr(1, "alice", "A1", 1, None)]);
        let builder = ReportBuilder::new(source, config(Some(9)));
        let (summary, _text, csv) = run(&builder).await;

        assert_eq!(summary, ReportSummary { members: 2, created: 2, reviewed: 2 });
        let tags: Vec<&str> = csv[3..].iter().map(|row| &row[..2]).collect();
        assert_eq!(tags, vec!["C,", "C,", "R,", "R,"]);
        assert!(csv[5].starts_with("R,bob,alice,open,3,B1,"));
        assert!(csv[6].starts_with("R,alice,bob,open,1,A1,"));

        let queries = builder.source.queries.lock().unwrap();
        assert_eq!(queries.len(), 4);
        assert!(queries[0].ends_with("author:alice"));
        assert!(queries[1].ends_with("commenter:alice"));
        assert!(queries[2].ends_with("author:bob"));
        assert!(queries[0].contains("created:>2026-10-04T12:00:00Z"));
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let builder = ReportBuilder::new(FailingSource, config(Some(9)));
        let mut text = Vec::new();
        let mut csv = Vec::new();
        let err = builder
            .write_report(&mut text, &mut csv, now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GitHubApi(_)));
        assert!(String::from_utf8(text).unwrap().contains("Team Member alice"));
    }

    #[tokio::test]
    async fn test_generate_writes_both_files() {
        let mut source = FakeSource::with_members(&["alice"]);
        source.add("alice", SearchType::Author, vec![pr(1, "alice", "A1", 1, None)]);
        let builder = ReportBuilder::new(source, config(Some(9)));
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("weekly.csv"), "stale contents\n".repeat(50)).unwrap();

        let summary = builder.generate(dir.path()).await.unwrap();
        assert_eq!(summary.created, 1);

        let csv = std::fs::read_to_string(dir.path().join("weekly.csv")).unwrap();
        assert!(!csv.contains("stale"));
        assert_eq!(csv.lines().nth(2), Some(CSV_HEADER));
        let text = std::fs::read_to_string(dir.path().join("weekly.txt")).unwrap();
        assert!(text.contains("alice: 1 created (1 open / 0 closed)"));
    }
}
