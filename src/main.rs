mod cli;
mod config;
mod error;
mod extract;
mod github;
mod logging;
mod orchestrator;
mod report;
mod summarizer;

use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, ResolvedConfig};
use error::Result;
use extract::PolicyTable;
use github::auth::resolve_token;
use github::DATE_FORMAT;
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::Orchestrator;
use report::REPORT_FILE;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::time::Duration;
use summarizer::{write_summary, Summarizer, SUMMARY_FILE};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    logging::init_logging(cli.verbose);

    // Handle subcommands
    if let Some(command) = &cli.command {
        return handle_command(command, &cli);
    }

    let config = apply_cli_overrides(Config::load_from(&cli.config)?, &cli);

    let config = match config.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("\nCheck your configuration at: {}", cli.config.display());
            std::process::exit(1);
        }
    };

    run(config, &cli).await
}

async fn run(config: ResolvedConfig, cli: &Cli) -> Result<()> {
    println!("pr-recap v{}", env!("CARGO_PKG_VERSION"));
    println!("\n{}", "=".repeat(60));
    println!("Author: {}", config.username);
    println!("Repositories: {}", config.repos.len());
    println!(
        "Timespan: {} to {}",
        config.timespan.start.format(DATE_FORMAT),
        config.timespan.end.format(DATE_FORMAT)
    );
    println!("Output: {}", config.output_dir.display());
    println!("{}\n", "=".repeat(60));

    fs::create_dir_all(&config.output_dir)?;

    let report_path = config.output_dir.join(REPORT_FILE);
    let summary_path = config.output_dir.join(SUMMARY_FILE);

    // Summary first: declining it ends the run
    if !cli.skip_summary && !should_write(&summary_path, cli.force)? {
        tracing::info!(
            "Summary file {} already exists and user chose not to overwrite. Nothing to do.",
            summary_path.display()
        );
        return Ok(());
    }

    let summarizer = Summarizer::new(config.summarizer_command.clone());
    let extra_prompt = config.extra_prompt.clone();

    if should_write(&report_path, cli.force)? {
        if !collect_report(config, cli, &report_path).await? {
            return Ok(());
        }
    } else {
        tracing::info!("Using existing PR descriptions from {}", report_path.display());
    }

    if cli.skip_summary {
        println!("✓ PR report written to {}", report_path.display());
        return Ok(());
    }

    let spinner = spinner("Generating summary...");
    let summary = summarizer
        .summarize(&report_path, extra_prompt.as_deref())
        .await;
    spinner.finish_and_clear();

    write_summary(&summary?, &summary_path)?;
    println!("✓ Summary written to {}", summary_path.display());

    Ok(())
}

/// Fetch PRs and write the report. Returns `false` when there was nothing to report.
async fn collect_report(config: ResolvedConfig, cli: &Cli, report_path: &Path) -> Result<bool> {
    let token = resolve_token(cli.github_token.as_deref(), config.github_token.as_deref())?;
    let orchestrator = Orchestrator::new(config, token)?;

    let repo_count = orchestrator.config().repos.len();
    let counting = spinner(&format!("Counting PRs across {} repositories...", repo_count));
    let total = orchestrator.count_pull_requests().await;
    counting.finish_with_message(format!("Found {} PRs to process", total));

    if total == 0 {
        tracing::info!("No merged PRs found in the specified time range.");
        return Ok(false);
    }

    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    progress.set_message("Processing PRs");

    let prs = orchestrator.collect_pull_requests(Some(&progress)).await;
    progress.finish_with_message(format!("Completed processing {} merged PRs", prs.len()));

    orchestrator.write_report(&prs, report_path)?;
    Ok(true)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn handle_command(command: &Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Init { force } => {
            let config_path = &cli.config;

            if config_path.exists() && !force {
                eprintln!("Config file already exists at: {}", config_path.display());
                eprintln!("Use --force to overwrite");
                std::process::exit(1);
            }

            Config::create_default_at(config_path)?;
            println!("✓ Created config file at: {}", config_path.display());
            println!("\nEdit username, output_dir and repos, then run pr-recap.");
            println!("To authenticate with GitHub, either:");
            println!("  1. Log in with `gh auth login`");
            println!("  2. Set the GITHUB_TOKEN environment variable");
            println!("  3. Add github_token to the config file");
        }
        Commands::Config => {
            let config = apply_cli_overrides(Config::load_from(&cli.config)?, cli);
            let toml_str = toml::to_string_pretty(&config.redacted())?;
            println!("Current configuration:\n");
            println!("{}", toml_str);
        }
        Commands::Extract { repo, file } => {
            let description = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut input = String::new();
                    io::stdin().read_to_string(&mut input)?;
                    input
                }
            };

            let excerpt = if cli.config.exists() {
                let config = Config::load_from(&cli.config)?;
                let mut policies = PolicyTable::with_defaults();
                policies.extend_policies(config.policies);
                if !policies.contains(repo) {
                    tracing::debug!("No description policy for {}, printing it unchanged", repo);
                }
                policies.select_description(repo, &description)
            } else {
                extract::select_description(repo, &description)
            };

            println!("{}", excerpt);
        }
    }
    Ok(())
}

/// Whether `path` may be (over)written, asking on stdin if it exists
fn should_write(path: &Path, force: bool) -> Result<bool> {
    if force || !path.try_exists()? {
        return Ok(true);
    }

    let stdin = io::stdin();
    confirm_overwrite(path, stdin.lock(), io::stdout())
}

/// Ask whether to overwrite an existing file (default: no)
fn confirm_overwrite<R: BufRead, W: Write>(path: &Path, mut input: R, mut output: W) -> Result<bool> {
    write!(
        output,
        "File {} already exists. Do you want to overwrite it? (y/N): ",
        path.display()
    )?;
    output.flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;

    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    // Override username if provided
    if let Some(ref username) = cli.username {
        config.username = username.clone();
    }

    // A lookback window replaces explicit dates and vice versa
    if let Some(days) = cli.days {
        config.days = Some(days);
        config.since = None;
        config.until = None;
    }

    if let (Some(since), Some(until)) = (&cli.since, &cli.until) {
        config.since = Some(since.clone());
        config.until = Some(until.clone());
        config.days = None;
    }

    // Override output directory
    if let Some(ref output_dir) = cli.output_dir {
        config.output_dir = output_dir.clone();
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_confirm_overwrite_answers() {
        let path = Path::new("review/summary.md");

        for (answer, expected) in [
            ("y\n", true),
            ("YES\n", true),
            ("  yes  \n", true),
            ("n\n", false),
            ("\n", false),
            ("", false),
            ("sure\n", false),
        ] {
            let mut output = Vec::new();
            let result = confirm_overwrite(path, Cursor::new(answer), &mut output).unwrap();
            assert_eq!(result, expected, "answer {:?}", answer);

            let prompt = String::from_utf8(output).unwrap();
            assert!(prompt.contains("File review/summary.md already exists."));
        }
    }

    #[test]
    fn test_should_write_missing_file_or_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prs.md");
        assert!(should_write(&path, false).unwrap());

        fs::write(&path, "existing").unwrap();
        assert!(should_write(&path, true).unwrap());
    }

    #[test]
    fn test_apply_cli_overrides() {
        let cli = Cli::parse_from(vec![
            "pr-recap",
            "--username",
            "hubot",
            "--since",
            "2025-01-01",
            "--until",
            "2025-03-31",
            "--output-dir",
            "elsewhere",
        ]);

        let config = apply_cli_overrides(Config::default(), &cli);
        assert_eq!(config.username, "hubot");
        assert_eq!(config.since.as_deref(), Some("2025-01-01"));
        assert_eq!(config.until.as_deref(), Some("2025-03-31"));
        assert!(config.days.is_none());
        assert_eq!(config.output_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn test_apply_cli_days_override_clears_dates() {
        let cli = Cli::parse_from(vec!["pr-recap", "--days", "7"]);
        let config = Config {
            since: Some("2025-01-01".to_string()),
            until: Some("2025-02-01".to_string()),
            days: None,
            ..Config::default()
        };

        let config = apply_cli_overrides(config, &cli);
        assert_eq!(config.days, Some(7));
        assert!(config.since.is_none());
        assert!(config.until.is_none());
    }
}
