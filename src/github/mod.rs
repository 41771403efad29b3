pub mod auth;
pub mod client;

use crate::error::{PrRecapError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Date format used in config files and search queries
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static NEXT_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).expect("NEXT_LINK_RE is a valid regex")
});

/// GitHub repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoName {
    /// Create a GitHub PR URL
    pub fn pr_url(&self, pr_number: u64) -> String {
        format!("https://github.com/{}/{}/pull/{}", self.owner, self.name, pr_number)
    }
}

impl FromStr for RepoName {
    type Err = PrRecapError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 2 {
            return Err(PrRecapError::invalid_repo(s, "expected 'owner/name'"));
        }

        let owner = parts[0].trim();
        let name = parts[1].trim();
        if owner.is_empty() || name.is_empty() {
            return Err(PrRecapError::invalid_repo(
                s,
                "owner and name cannot be empty",
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A merged pull request as shown in the report
#[derive(Debug, Clone)]
pub struct PullRequestInfo {
    /// Repository identifier (`owner/name`)
    pub repository: String,
    pub number: u64,
    pub title: String,
    /// Raw description as written by the author
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Timespan for filtering pull requests
#[derive(Debug, Clone)]
pub struct Timespan {
    /// Start date (inclusive)
    pub start: DateTime<Utc>,
    /// End date (inclusive)
    pub end: DateTime<Utc>,
}

impl Timespan {
    /// Create a timespan from days back from now
    pub fn days_back(days: u32) -> Self {
        let end = Utc::now();
        let start = end - Duration::days(days as i64);
        Self { start, end }
    }

    /// Create a timespan covering whole calendar days, `until` included
    pub fn from_dates(since: NaiveDate, until: NaiveDate) -> Self {
        let start = Utc.from_utc_datetime(&since.and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&until.and_time(NaiveTime::MIN))
            + Duration::days(1)
            - Duration::seconds(1);
        Self { start, end }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
        PrRecapError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

/// Build the issue-search query for merged PRs by `username` in `repo`
pub fn build_search_query(repo: &RepoName, username: &str, timespan: &Timespan) -> String {
    format!(
        "repo:{} is:pr is:merged author:{} created:{}..{}",
        repo,
        username,
        timespan.start.format(DATE_FORMAT),
        timespan.end.format(DATE_FORMAT)
    )
}

/// Extract the `rel="next"` URL from a `Link` response header
pub fn next_page_url(link_header: &str) -> Option<String> {
    NEXT_LINK_RE
        .captures(link_header)
        .and_then(|captures| captures.get(1))
        .map(|url| url.as_str().to_string())
}
