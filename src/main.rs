use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use team_pr_stats::config::DEFAULT_ENVIRONMENT;
use team_pr_stats::report::print_rate_status;
use team_pr_stats::{Config, GitHubClient, ReportBuilder, ReportConfig};

#[derive(Parser, Debug)]
#[command(name = "team-pr-stats")]
#[command(version = "0.1.0")]
#[command(about = "Report pull requests created and reviewed by a team over the last two weeks")]
struct Args {
    /// Directory holding appsettings.json
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Settings environment; also loads appsettings.<environment>.json
    #[arg(long, env = "REPORT_ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
    environment: String,

    /// Directory the .txt and .csv reports are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Look the team up by name when no team id is configured
    #[arg(long)]
    team_name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("team_pr_stats=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::load(&args.config_dir, &args.environment)?;

    let github = GitHubClient::new(&config)?;
    print_rate_status(&github).await?;

    if config.team_id.is_none() {
        if let Some(team_name) = args.team_name.as_deref() {
            let org = config.org.clone().unwrap_or_default();
            let team_id = github.require_team_id(&org, team_name).await?;
            tracing::info!("Resolved team {} to id {}", team_name, team_id);
            config.team_id = Some(team_id);
        }
    }

    let builder = ReportBuilder::new(github, ReportConfig::from(&config));

    println!("Getting Info");
    let summary = builder.generate(&args.output_dir).await?;
    tracing::info!(
        "Reported {} members: {} created, {} reviewed",
        summary.members,
        summary.created,
        summary.reviewed
    );

    Ok(())
}
