use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::error::{Error, Result};

pub const SETTINGS_FILE: &str = "appsettings.json";
pub const SETTINGS_SECTION: &str = "GithubOptions";
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "pr-report";
pub const DEFAULT_DAYS_BACK: u32 = 14;
pub const DEFAULT_ENVIRONMENT: &str = "Production";

/// Connection and output settings, read from the `GithubOptions` section of
/// the settings files and overridden by environment variables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    pub user: Option<String>,
    #[serde(rename = "APIKey", alias = "ApiKey")]
    pub api_key: Option<String>,
    pub org: Option<String>,
    pub repo: Option<String>,
    pub url_root: Option<String>,
    pub team_id: Option<u64>,
    pub app_name: Option<String>,
    pub output_file_name: Option<String>,
}

impl Config {
    /// Loads `appsettings.json`, then `appsettings.{environment}.json`, then
    /// the process environment. Missing files are skipped.
    pub fn load(dir: &Path, environment: &str) -> Result<Self> {
        let mut config = Self::load_files(dir, environment)?;
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_files(dir: &Path, environment: &str) -> Result<Self> {
        let mut config = Self::default();

        let files = [
            dir.join(SETTINGS_FILE),
            dir.join(format!("appsettings.{}.json", environment)),
        ];

        for path in files {
            if !path.exists() {
                tracing::debug!("Settings file {} not present", path.display());
                continue;
            }
            tracing::debug!("Reading settings from {}", path.display());
            let contents = std::fs::read_to_string(&path)?;
            config.merge(Self::from_settings_json(&contents)?);
        }

        Ok(config)
    }

    /// Parses the `GithubOptions` section of a settings document. A document
    /// without that section yields an empty config.
    pub fn from_settings_json(contents: &str) -> Result<Self> {
        let root: serde_json::Value = serde_json::from_str(contents)?;
        match root.get(SETTINGS_SECTION) {
            Some(section) => Ok(serde_json::from_value(section.clone())?),
            None => Ok(Self::default()),
        }
    }

    /// Overlays every value set in `other` onto `self`.
    pub fn merge(&mut self, other: Config) {
        fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        overlay(&mut self.user, other.user);
        overlay(&mut self.api_key, other.api_key);
        overlay(&mut self.org, other.org);
        overlay(&mut self.repo, other.repo);
        overlay(&mut self.url_root, other.url_root);
        overlay(&mut self.team_id, other.team_id);
        overlay(&mut self.app_name, other.app_name);
        overlay(&mut self.output_file_name, other.output_file_name);
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let team_id = match lookup("GITHUB_TEAM_ID") {
            Some(v) => Some(v.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("GITHUB_TEAM_ID is not a valid team id: {}", v))
            })?),
            None => None,
        };

        self.merge(Config {
            user: lookup("GITHUB_USER"),
            api_key: lookup("GITHUB_API_KEY"),
            org: lookup("GITHUB_ORG"),
            repo: lookup("GITHUB_REPO"),
            url_root: lookup("GITHUB_URL_ROOT"),
            team_id,
            app_name: lookup("GITHUB_APP_NAME"),
            output_file_name: lookup("REPORT_OUTPUT_FILE"),
        });
        Ok(())
    }

    /// `"{org}/{repo}"`, with absent parts left empty.
    pub fn fq_repo(&self) -> String {
        format!(
            "{}/{}",
            self.org.as_deref().unwrap_or_default(),
            self.repo.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub repo: String,
    pub team_id: Option<u64>,
    pub days_back: u32,
    pub output_file_name: String,
}

impl From<&Config> for ReportConfig {
    fn from(config: &Config) -> Self {
        Self {
            repo: config.fq_repo(),
            team_id: config.team_id,
            days_back: DEFAULT_DAYS_BACK,
            output_file_name: config
                .output_file_name
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE_NAME.to_string()),
        }
    }
}
