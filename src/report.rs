use crate::error::Result;
use crate::extract::PolicyTable;
use crate::github::PullRequestInfo;
use std::fs;
use std::path::Path;

/// File name of the PR report inside the output directory
pub const REPORT_FILE: &str = "prs.md";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render merged pull requests as markdown, grouped by repository.
///
/// Groups keep the order in which repositories first appear in `prs`.
pub fn render_markdown(prs: &[PullRequestInfo], policies: &PolicyTable) -> String {
    let mut output = String::new();

    output.push_str("# Merged Pull Requests\n\n");
    output.push_str(&format!("Found {} merged pull requests.\n\n", prs.len()));

    if prs.is_empty() {
        output.push_str("*No merged PRs found.*\n");
        return output;
    }

    for (repository, group) in group_by_repository(prs) {
        output.push_str(&format!("## {}\n\n", repository));

        for pr in group {
            render_pull_request(&mut output, pr, policies);
        }
    }

    output
}

fn render_pull_request(output: &mut String, pr: &PullRequestInfo, policies: &PolicyTable) {
    output.push_str(&format!("### [{}]({})\n\n", pr.title, pr.url));

    output.push_str("| Field | Value |\n");
    output.push_str("|-------|-------|\n");
    output.push_str(&format!(
        "| **Created** | {} |\n",
        pr.created_at.format(TIMESTAMP_FORMAT)
    ));
    output.push_str(&format!("| **Link** | <{}> |\n", pr.url));
    match pr.merged_at {
        Some(merged_at) => output.push_str(&format!(
            "| **Merged** | {} |\n",
            merged_at.format(TIMESTAMP_FORMAT)
        )),
        None => output.push_str("| **Merged** | *Not available* |\n"),
    }
    output.push('\n');

    output.push_str("#### Description\n\n");
    if pr.description.trim().is_empty() {
        output.push_str("*No description provided.*\n\n");
    } else {
        let excerpt = policies.select_description(&pr.repository, &pr.description);
        output.push_str(&format!("{}\n\n", excerpt));
    }

    output.push_str("---\n\n");
}

fn group_by_repository(prs: &[PullRequestInfo]) -> Vec<(&str, Vec<&PullRequestInfo>)> {
    let mut groups: Vec<(&str, Vec<&PullRequestInfo>)> = Vec::new();

    for pr in prs {
        match groups.iter_mut().find(|(repo, _)| *repo == pr.repository) {
            Some((_, group)) => group.push(pr),
            None => groups.push((pr.repository.as_str(), vec![pr])),
        }
    }

    groups
}

/// Render and write the report to `path`
pub fn write_report(prs: &[PullRequestInfo], policies: &PolicyTable, path: &Path) -> Result<()> {
    tracing::info!("Writing PR details to {}", path.display());
    fs::write(path, render_markdown(prs, policies))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn pr(repository: &str, number: u64, description: &str) -> PullRequestInfo {
        PullRequestInfo {
            repository: repository.to_string(),
            number,
            title: format!("PR {}", number),
            description: description.to_string(),
            url: format!("https://github.com/{}/pull/{}", repository, number),
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            merged_at: Some(Utc.with_ymd_and_hms(2025, 1, 3, 4, 5, 6).unwrap()),
        }
    }

    #[test]
    fn test_render_empty() {
        let markdown = render_markdown(&[], &PolicyTable::with_defaults());
        assert_eq!(
            markdown,
            "# Merged Pull Requests\n\nFound 0 merged pull requests.\n\n*No merged PRs found.*\n"
        );
    }

    #[test]
    fn test_render_single_pr() {
        let markdown = render_markdown(&[pr("acme/widgets", 1, "Adds widgets.")], &PolicyTable::new());

        let expected = "# Merged Pull Requests

Found 1 merged pull requests.

## acme/widgets

### [PR 1](https://github.com/acme/widgets/pull/1)

| Field | Value |
|-------|-------|
| **Created** | 2025-01-02 03:04:05 |
| **Link** | <https://github.com/acme/widgets/pull/1> |
| **Merged** | 2025-01-03 04:05:06 |

#### Description

Adds widgets.

---

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_render_not_merged_and_no_description() {
        let mut unmerged = pr("acme/widgets", 2, "  \n ");
        unmerged.merged_at = None;

        let markdown = render_markdown(&[unmerged], &PolicyTable::new());
        assert!(markdown.contains("| **Merged** | *Not available* |"));
        assert!(markdown.contains("#### Description\n\n*No description provided.*\n\n---"));
    }

    #[test]
    fn test_render_groups_in_first_seen_order() {
        let prs = vec![
            pr("zeta/last", 1, "z1"),
            pr("alpha/first", 2, "a1"),
            pr("zeta/last", 3, "z2"),
        ];

        let markdown = render_markdown(&prs, &PolicyTable::new());
        assert_eq!(markdown.matches("## zeta/last").count(), 1);

        let zeta = markdown.find("## zeta/last").unwrap();
        let alpha = markdown.find("## alpha/first").unwrap();
        let z2 = markdown.find("[PR 3]").unwrap();
        assert!(zeta < z2 && z2 < alpha);
    }

    #[test]
    fn test_render_applies_repository_policy() {
        let description = "### What are you trying to accomplish?\n\nRotate keys.\n\n### How is it being implemented?\n\nCarefully.";
        let prs = vec![
            pr("github/token-scanning-service", 1, description),
            pr("acme/widgets", 2, description),
        ];

        let markdown = render_markdown(&prs, &PolicyTable::with_defaults());
        assert!(markdown.contains("#### Description\n\nRotate keys.\n\n---"));
        assert!(markdown.contains(&format!("#### Description\n\n{}\n\n---", description)));
    }

    #[test]
    fn test_write_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(REPORT_FILE);

        write_report(&[pr("acme/widgets", 1, "x")], &PolicyTable::new(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Merged Pull Requests"));
    }
}
