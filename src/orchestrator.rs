use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::{build_search_query, PullRequestInfo, RepoName};
use crate::report::write_report;
use indicatif::ProgressBar;
use std::path::Path;

/// Orchestrator for coordinating the collection workflow
pub struct Orchestrator {
    config: ResolvedConfig,
    client: GitHubClient,
}

impl Orchestrator {
    /// Create a new orchestrator authenticated with `token`
    pub fn new(config: ResolvedConfig, token: String) -> Result<Self> {
        let mut client = GitHubClient::new(token)?;
        if let Some(ref api_url) = config.github_api_url {
            client = client.with_base_url(api_url.as_str());
        }

        Ok(Self::with_client(config, client))
    }

    /// Create an orchestrator around an existing client
    pub fn with_client(config: ResolvedConfig, client: GitHubClient) -> Self {
        Self { config, client }
    }

    fn search_query(&self, repo: &RepoName) -> String {
        let query = build_search_query(repo, &self.config.username, &self.config.timespan);
        tracing::debug!("GitHub search query for {}: {}", repo, query);
        query
    }

    /// Count merged PRs across all repositories.
    ///
    /// Repositories that fail are logged and left out of the total.
    pub async fn count_pull_requests(&self) -> u64 {
        let mut total = 0;

        for repo in &self.config.repos {
            match self.client.count_merged_prs(&self.search_query(repo)).await {
                Ok(count) => {
                    tracing::debug!("{} merged PRs in {}", count, repo);
                    total += count;
                }
                Err(e) => tracing::warn!("Error counting PRs from {}: {}", repo, e),
            }
        }

        total
    }

    /// Fetch merged PRs from every repository, in configuration order.
    ///
    /// Repositories that fail are logged and skipped.
    pub async fn collect_pull_requests(&self, progress: Option<&ProgressBar>) -> Vec<PullRequestInfo> {
        let mut prs = Vec::new();

        for repo in &self.config.repos {
            let query = self.search_query(repo);
            match self.client.fetch_merged_prs(repo, &query, progress).await {
                Ok(repo_prs) => prs.extend(repo_prs),
                Err(e) => tracing::warn!("Error fetching PRs from {}: {}", repo, e),
            }
        }

        prs
    }

    /// Write the markdown report using the configured description policies
    pub fn write_report(&self, prs: &[PullRequestInfo], path: &Path) -> Result<()> {
        write_report(prs, &self.config.policies, path)
    }

    /// Get a reference to the config
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(server: &MockServer) -> ResolvedConfig {
        Config {
            username: "octocat".to_string(),
            since: Some("2025-01-01".to_string()),
            until: Some("2025-01-31".to_string()),
            days: None,
            repos: vec![
                "github/github".to_string(),
                "github/token-scanning-service".to_string(),
            ],
            github_api_url: Some(server.uri()),
            ..Config::default()
        }
        .resolve()
        .unwrap()
    }

    fn query_for(repo: &str) -> String {
        format!(
            "repo:{} is:pr is:merged author:octocat created:2025-01-01..2025-01-31",
            repo
        )
    }

    async fn mount_repo(server: &MockServer, repo: &str, number: u64, body: &str) {
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", query_for(repo).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "items": [{
                    "number": number,
                    "title": format!("Change {}", number),
                    "body": body,
                    "html_url": format!("https://github.com/{}/pull/{}", repo, number),
                    "created_at": "2025-01-10T12:00:00Z"
                }]
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/pulls/{}", repo, number)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": body,
                "merged_at": "2025-01-11T12:00:00Z"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_orchestrator_uses_configured_api_url() {
        let server = MockServer::start().await;
        let orchestrator = Orchestrator::new(create_test_config(&server), "t".to_string()).unwrap();
        assert_eq!(orchestrator.config().username, "octocat");
        assert_eq!(orchestrator.count_pull_requests().await, 0);
    }

    #[tokio::test]
    async fn test_count_and_collect_across_repositories() {
        let server = MockServer::start().await;
        let description = "### What are you trying to accomplish?\n\nAdd the thing.\n\n### What approach did you choose and why?\n\nBecause.";
        mount_repo(&server, "github/github", 1, description).await;
        mount_repo(&server, "github/token-scanning-service", 2, description).await;

        let orchestrator = Orchestrator::new(create_test_config(&server), "t".to_string()).unwrap();

        assert_eq!(orchestrator.count_pull_requests().await, 2);

        let prs = orchestrator.collect_pull_requests(None).await;
        assert_eq!(prs.len(), 2);
        assert_eq!(prs[0].repository, "github/github");
        assert_eq!(prs[1].repository, "github/token-scanning-service");

        let temp_dir = TempDir::new().unwrap();
        let report = temp_dir.path().join("prs.md");
        orchestrator.write_report(&prs, &report).unwrap();

        let markdown = fs::read_to_string(&report).unwrap();
        assert!(markdown.contains("Found 2 merged pull requests."));
        assert_eq!(markdown.matches("#### Description\n\nAdd the thing.\n\n---").count(), 2);
    }

    #[tokio::test]
    async fn test_failing_repository_is_skipped() {
        let server = MockServer::start().await;
        mount_repo(&server, "github/github", 1, "Plain body").await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", query_for("github/token-scanning-service").as_str()))
            .respond_with(ResponseTemplate::new(422).set_body_string("Validation Failed"))
            .mount(&server)
            .await;

        let orchestrator = Orchestrator::new(create_test_config(&server), "t".to_string()).unwrap();

        assert_eq!(orchestrator.count_pull_requests().await, 1);

        let prs = orchestrator.collect_pull_requests(None).await;
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].description, "Plain body");
    }
}
