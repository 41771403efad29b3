use crate::error::{PrRecapError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// File name of the generated summary inside the output directory
pub const SUMMARY_FILE: &str = "summary.md";

/// Build the summarizer prompt for a report file
pub fn build_prompt(report_file_name: &str, extra_prompt: Option<&str>) -> String {
    let mut prompt = format!(
        "An employee is undergoing a performance review. They have contributed to the company by merging several pull requests.
Describe their major contributions based on the PR descriptions in @{}. Be sure to emphasize the impact of their work and any significant features or improvements they introduced.
Include links to PRs. Don't write any files.",
        report_file_name
    );

    if let Some(extra) = extra_prompt.map(str::trim).filter(|extra| !extra.is_empty()) {
        prompt.push_str("\n\nAdditional instructions:\n");
        prompt.push_str(extra);
    }

    prompt
}

/// Runs an external, Copilot-compatible CLI over the report
pub struct Summarizer {
    command: String,
}

impl Summarizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Arguments passed to the summarizer for a report in `dir`
    fn args(dir: &Path, prompt: &str) -> Vec<String> {
        vec![
            "--disable-builtin-mcps".to_string(),
            "--deny-tool".to_string(),
            "--no-color".to_string(),
            "--no-custom-instructions".to_string(),
            "--add-dir".to_string(),
            dir.display().to_string(),
            "-p".to_string(),
            prompt.to_string(),
        ]
    }

    /// Summarize the report at `report_path`.
    ///
    /// The summarizer runs inside the report's directory and is pointed at
    /// the report by file name.
    pub async fn summarize(&self, report_path: &Path, extra_prompt: Option<&str>) -> Result<String> {
        let (dir, file_name) = split_report_path(report_path)?;
        let prompt = build_prompt(&file_name, extra_prompt);

        tracing::debug!("Summarizer prompt: {}", prompt);

        let output = Command::new(&self.command)
            .args(Self::args(&dir, &prompt))
            .current_dir(&dir)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PrRecapError::summarizer(format!(
                    "`{}` not found (make sure the {} CLI is installed and on PATH)",
                    self.command, self.command
                )),
                _ => PrRecapError::summarizer(format!("failed to run `{}`: {}", self.command, e)),
            })?;

        if !output.status.success() {
            return Err(PrRecapError::summarizer(format!(
                "`{}` exited with {}\nStderr: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let summary = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if summary.is_empty() {
            return Err(PrRecapError::summarizer(format!(
                "`{}` returned an empty summary",
                self.command
            )));
        }

        Ok(summary)
    }
}

/// Absolute directory and file name of the report
fn split_report_path(report_path: &Path) -> Result<(PathBuf, String)> {
    let file_name = report_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| {
            PrRecapError::other(format!("not a report file: {}", report_path.display()))
        })?;

    let dir = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((fs::canonicalize(dir)?, file_name))
}

/// Format the summary document
pub fn render_summary(summary: &str) -> String {
    format!("# PR Summary\n\n{}\n", summary)
}

/// Write the summary document to `path`
pub fn write_summary(summary: &str, path: &Path) -> Result<()> {
    tracing::info!("Writing summary to {}", path.display());
    fs::write(path, render_summary(summary))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt("prs.md", None);
        assert!(prompt.starts_with("An employee is undergoing a performance review."));
        assert!(prompt.contains("PR descriptions in @prs.md."));
        assert!(prompt.ends_with("Include links to PRs. Don't write any files."));
        assert!(!prompt.contains("Additional instructions"));
    }

    #[test]
    fn test_build_prompt_with_extra_instructions() {
        let prompt = build_prompt("prs.md", Some("  Focus on security.\n"));
        assert!(prompt.ends_with(
            "Don't write any files.\n\nAdditional instructions:\nFocus on security."
        ));

        assert_eq!(build_prompt("prs.md", Some("   ")), build_prompt("prs.md", None));
    }

    #[test]
    fn test_args_layout() {
        let args = Summarizer::args(Path::new("/tmp/review"), "summarize");
        assert_eq!(args[0], "--disable-builtin-mcps");
        assert_eq!(args[4], "--add-dir");
        assert_eq!(args[5], "/tmp/review");
        assert_eq!(args[6..], ["-p".to_string(), "summarize".to_string()]);
    }

    #[test]
    fn test_render_and_write_summary() {
        assert_eq!(render_summary("Great work."), "# PR Summary\n\nGreat work.\n");

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SUMMARY_FILE);
        write_summary("Great work.", &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# PR Summary\n\nGreat work.\n"
        );
    }

    fn report_in(temp_dir: &TempDir) -> PathBuf {
        let path = temp_dir.path().join("prs.md");
        fs::write(&path, "# Merged Pull Requests\n").unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_summarize_captures_stdout() {
        let temp_dir = TempDir::new().unwrap();
        let report = report_in(&temp_dir);

        // echo prints its arguments, standing in for the real CLI
        let summary = Summarizer::new("echo")
            .summarize(&report, Some("Be brief."))
            .await
            .unwrap();

        assert!(summary.starts_with("--disable-builtin-mcps"));
        assert!(summary.contains("@prs.md"));
        assert!(summary.ends_with("Be brief."));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_summarize_failure_status() {
        let temp_dir = TempDir::new().unwrap();
        let report = report_in(&temp_dir);

        let result = Summarizer::new("false").summarize(&report, None).await;
        assert!(matches!(result, Err(PrRecapError::Summarizer(_))));
    }

    #[tokio::test]
    async fn test_summarize_missing_command() {
        let temp_dir = TempDir::new().unwrap();
        let report = report_in(&temp_dir);

        let err = Summarizer::new("pr-recap-no-such-summarizer")
            .summarize(&report, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
