pub mod comments;
pub mod sections;

pub use sections::{extract_description_primary, extract_first_section};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Turns a raw PR description into the excerpt written to the report.
///
/// Implementations must accept any string, including empty or malformed
/// markdown, without panicking.
pub trait DescriptionExtractor: Send + Sync {
    fn extract(&self, description: &str) -> String;
}

impl<F> DescriptionExtractor for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn extract(&self, description: &str) -> String {
        self(description)
    }
}

/// Built-in extraction policies, selectable by name in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Content of the first "What are you trying to accomplish?" section
    FirstSection,
    /// Accomplish section, else everything before the approach section
    AccomplishOrTruncate,
    /// The description as written
    PassThrough,
}

impl Policy {
    pub fn apply(self, description: &str) -> String {
        match self {
            Policy::FirstSection => extract_first_section(description),
            Policy::AccomplishOrTruncate => extract_description_primary(description),
            Policy::PassThrough => description.to_string(),
        }
    }
}

impl DescriptionExtractor for Policy {
    fn extract(&self, description: &str) -> String {
        self.apply(description)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Policy::FirstSection => "first-section",
            Policy::AccomplishOrTruncate => "accomplish-or-truncate",
            Policy::PassThrough => "pass-through",
        };
        f.write_str(name)
    }
}

/// Repositories with a dedicated template and the policy that reads it
pub const DEFAULT_POLICIES: &[(&str, Policy)] = &[
    ("github/token-scanning-service", Policy::FirstSection),
    ("github/github", Policy::AccomplishOrTruncate),
];

static DEFAULT_TABLE: Lazy<PolicyTable> = Lazy::new(PolicyTable::with_defaults);

/// Maps repository identifiers (`owner/name`) to extractors.
///
/// Lookups are exact and case-sensitive. Repositories without an entry get
/// their description back unchanged.
pub struct PolicyTable {
    extractors: HashMap<String, Box<dyn DescriptionExtractor>>,
}

impl PolicyTable {
    /// Create an empty table where every repository passes through
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Create a table holding [`DEFAULT_POLICIES`]
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (repository, policy) in DEFAULT_POLICIES {
            table.register(*repository, *policy);
        }
        table
    }

    /// Register an extractor for a repository, replacing any existing one
    pub fn register<E>(&mut self, repository: impl Into<String>, extractor: E) -> &mut Self
    where
        E: DescriptionExtractor + 'static,
    {
        self.extractors
            .insert(repository.into(), Box::new(extractor));
        self
    }

    /// Register built-in policies by repository, e.g. from the config file
    pub fn extend_policies<I, S>(&mut self, policies: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, Policy)>,
        S: Into<String>,
    {
        for (repository, policy) in policies {
            self.register(repository, policy);
        }
        self
    }

    /// Whether a repository has a dedicated extractor
    pub fn contains(&self, repository: &str) -> bool {
        self.extractors.contains_key(repository)
    }

    /// Pick the excerpt of `description` to show for `repository`
    pub fn select_description(&self, repository: &str, description: &str) -> String {
        match self.extractors.get(repository) {
            Some(extractor) => {
                tracing::trace!(repository, "applying repository description policy");
                extractor.extract(description)
            }
            None => description.to_string(),
        }
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for PolicyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut repositories: Vec<&String> = self.extractors.keys().collect();
        repositories.sort();
        f.debug_struct("PolicyTable")
            .field("repositories", &repositories)
            .finish()
    }
}

/// Pick the excerpt of `description` using the default policy table
pub fn select_description(repository: &str, description: &str) -> String {
    DEFAULT_TABLE.select_description(repository, description)
}
