use crate::error::{PrRecapError, Result};
use crate::extract::{Policy, PolicyTable};
use crate::github::{parse_date, RepoName, Timespan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Lookback window when neither `days` nor `since`/`until` is set
pub const DEFAULT_DAYS: u32 = 30;

/// Summarizer CLI invoked on the report
pub const DEFAULT_SUMMARIZER_COMMAND: &str = "copilot";

/// Application configuration, as read from the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// GitHub login whose merged PRs are collected
    #[serde(default)]
    pub username: String,

    /// Start date (YYYY-MM-DD), used together with `until`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,

    /// End date (YYYY-MM-DD, inclusive), used together with `since`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,

    /// Lookback window in days (default: 30)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,

    /// Directory receiving prs.md and summary.md
    #[serde(default)]
    pub output_dir: PathBuf,

    /// Extra instructions appended to the summarizer prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_prompt: Option<String>,

    /// Repositories to search, as `owner/name`
    #[serde(default)]
    pub repos: Vec<String>,

    /// GitHub token (optional, `gh auth token` is used otherwise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// API root for GitHub Enterprise Server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_api_url: Option<String>,

    /// Summarizer executable
    #[serde(default = "default_summarizer_command")]
    pub summarizer_command: String,

    /// Per-repository description policies, on top of the built-in ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub policies: BTreeMap<String, Policy>,
}

/// Validated configuration with every field parsed
#[derive(Debug)]
pub struct ResolvedConfig {
    pub username: String,
    pub timespan: Timespan,
    pub repos: Vec<RepoName>,
    pub output_dir: PathBuf,
    pub extra_prompt: Option<String>,
    pub github_token: Option<String>,
    pub github_api_url: Option<String>,
    pub summarizer_command: String,
    pub policies: PolicyTable,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrRecapError::config(format!(
                "Config file not found at: {} (run `pr-recap init` to create one)",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write a starter configuration file
    pub fn create_default_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(path, toml_string)?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(PrRecapError::MissingConfig("username is required".to_string()));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(PrRecapError::MissingConfig(
                "output_dir is required".to_string(),
            ));
        }

        if self.repos.is_empty() {
            return Err(PrRecapError::config("repos list cannot be empty"));
        }

        if self.since.is_some() != self.until.is_some() {
            return Err(PrRecapError::config(
                "since and until must be specified together",
            ));
        }

        if self.days.is_some() && self.since.is_some() {
            return Err(PrRecapError::config(
                "days cannot be combined with since/until. Choose one.",
            ));
        }

        if self.days == Some(0) {
            return Err(PrRecapError::config("days must be > 0"));
        }

        if self.summarizer_command.trim().is_empty() {
            return Err(PrRecapError::config("summarizer_command cannot be empty"));
        }

        Ok(())
    }

    /// Validate and parse into a [`ResolvedConfig`]
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let repos = self
            .repos
            .iter()
            .map(|repo| repo.parse())
            .collect::<Result<Vec<RepoName>>>()?;

        let timespan = match (&self.since, &self.until) {
            (Some(since), Some(until)) => {
                let since = parse_date(since)?;
                let until = parse_date(until)?;
                if since > until {
                    return Err(PrRecapError::config(format!(
                        "since ({}) is after until ({})",
                        since, until
                    )));
                }
                Timespan::from_dates(since, until)
            }
            _ => Timespan::days_back(self.days.unwrap_or(DEFAULT_DAYS)),
        };

        let mut policies = PolicyTable::with_defaults();
        policies.extend_policies(self.policies.iter().map(|(repo, policy)| (repo.as_str(), *policy)));

        Ok(ResolvedConfig {
            username: self.username.trim().to_string(),
            timespan,
            repos,
            output_dir: self.output_dir.clone(),
            extra_prompt: self
                .extra_prompt
                .as_deref()
                .map(str::trim)
                .filter(|prompt| !prompt.is_empty())
                .map(String::from),
            github_token: self.github_token.clone(),
            github_api_url: self.github_api_url.clone(),
            summarizer_command: self.summarizer_command.clone(),
            policies,
        })
    }

    /// Copy of the config that is safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.github_token.is_some() {
            config.github_token = Some("<redacted>".to_string());
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::from("your-github-username"),
            since: None,
            until: None,
            days: Some(DEFAULT_DAYS),
            output_dir: PathBuf::from("review"),
            extra_prompt: None,
            repos: vec![String::from("owner/name")],
            github_token: None,
            github_api_url: None,
            summarizer_command: default_summarizer_command(),
            policies: BTreeMap::new(),
        }
    }
}

// Serde default functions
fn default_summarizer_command() -> String {
    DEFAULT_SUMMARIZER_COMMAND.to_string()
}
