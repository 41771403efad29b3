use crate::error::{PrRecapError, Result};
use crate::github::{next_page_url, PullRequestInfo, RepoName};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use reqwest::header::{ACCEPT, LINK};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("pr-recap/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a new client for api.github.com
    pub fn new(token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: GITHUB_API_URL.to_string(),
            token,
        })
    }

    /// Point the client at another API root (GitHub Enterprise, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search/issues", self.base_url)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .bearer_auth(&self.token)
    }

    fn search(&self, query: &str, per_page: u32) -> RequestBuilder {
        self.get(&self.search_url())
            .query(&[("q", query), ("sort", "created"), ("order", "desc")])
            .query(&[("per_page", per_page)])
    }

    /// Send a request and decode its JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Page<T>> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PrRecapError::GitHubApi { status, message });
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_url);

        let body = response.text().await?;
        let data = serde_json::from_str(&body)?;

        Ok(Page { data, next })
    }

    /// Number of search hits for `query`, without fetching them
    pub async fn count_merged_prs(&self, query: &str) -> Result<u64> {
        let page: Page<SearchResponse> = self.send(self.search(query, 1)).await?;
        Ok(page.data.total_count)
    }

    /// Fetch every PR matching `query`, following pagination.
    ///
    /// Each hit is completed with the pull request's own body and merge time.
    pub async fn fetch_merged_prs(
        &self,
        repo: &RepoName,
        query: &str,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<PullRequestInfo>> {
        let mut prs = Vec::new();
        let mut request = self.search(query, PER_PAGE);

        loop {
            let page: Page<SearchResponse> = self.send(request).await?;

            for item in page.data.items {
                if let Some(bar) = progress {
                    bar.set_message(format!("Processing PR #{} from {}", item.number, repo));
                }

                prs.push(self.complete_pull_request(repo, item).await);

                if let Some(bar) = progress {
                    bar.inc(1);
                }
            }

            match page.next {
                Some(url) => request = self.get(&url),
                None => break,
            }
        }

        Ok(prs)
    }

    /// Fetch a single pull request
    pub async fn get_pull_request(&self, repo: &RepoName, number: u64) -> Result<PullRequestDetails> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.base_url, repo.owner, repo.name, number
        );
        let page: Page<PullRequestDetails> = self.send(self.get(&url)).await?;
        Ok(page.data)
    }

    async fn complete_pull_request(&self, repo: &RepoName, item: SearchItem) -> PullRequestInfo {
        let url = if item.html_url.is_empty() {
            repo.pr_url(item.number)
        } else {
            item.html_url
        };

        let mut info = PullRequestInfo {
            repository: repo.to_string(),
            number: item.number,
            title: item.title,
            description: item.body.unwrap_or_default(),
            url,
            created_at: item.created_at,
            merged_at: None,
        };

        // The search index can lag behind edits, prefer the PR's own body
        match self.get_pull_request(repo, item.number).await {
            Ok(details) => {
                if let Some(body) = details.body.filter(|body| !body.is_empty()) {
                    info.description = body;
                }
                info.merged_at = details.merged_at;
            }
            Err(e) => {
                tracing::warn!("failed to get PR details for {}#{}: {}", repo, item.number, e);
            }
        }

        info
    }
}

/// Decoded response body plus the next page, if any
struct Page<T> {
    data: T,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    #[serde(default)]
    html_url: String,
    created_at: DateTime<Utc>,
}

/// Fields of a pull request not present in search results
#[derive(Debug, Deserialize)]
pub struct PullRequestDetails {
    pub body: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
}
