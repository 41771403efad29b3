use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "pr-recap")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Summarize merged GitHub pull requests for a performance review",
    long_about = "pr-recap collects the pull requests a user merged across a set of repositories, \
                  writes their descriptions to a markdown report and asks an AI CLI \
                  to turn that report into a performance-review summary."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// GitHub username whose PRs are collected
    #[arg(short, long)]
    pub username: Option<String>,

    /// Number of days to look back
    #[arg(short, long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Start date (YYYY-MM-DD format)
    #[arg(long)]
    pub since: Option<String>,

    /// End date (YYYY-MM-DD format)
    #[arg(long)]
    pub until: Option<String>,

    /// Directory for prs.md and summary.md
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing output files without asking
    #[arg(short, long)]
    pub force: bool,

    /// Only write the PR report, skip the summarizer
    #[arg(long)]
    pub skip_summary: bool,

    /// GitHub token (defaults to `gh auth token`)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,

    /// Print the excerpt of a PR description that would go into the report
    Extract {
        /// Repository the description belongs to (owner/name)
        #[arg(short, long)]
        repo: String,

        /// File holding the description (default: stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        // Can't specify both --days and --since/--until
        if self.days.is_some() && (self.since.is_some() || self.until.is_some()) {
            return Err(
                "Cannot specify both --days and --since/--until. Choose one.".to_string()
            );
        }

        if self.since.is_some() != self.until.is_some() {
            return Err("--since and --until must be used together".to_string());
        }

        if self.days == Some(0) {
            return Err("--days must be greater than 0".to_string());
        }

        Ok(())
    }
}
