use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_ACCEPT: &str = "application/vnd.github.v3+json";
pub const DEFAULT_USER_AGENT: &str = "forge-harvest";

/// Largest page the forge serves.
pub const MAX_PER_PAGE: u32 = 100;

/// Hard upper bound on repositories kept per user.
pub const MAX_REPOSITORIES_PER_USER: usize = 500;

/// Bearer credential for the forge API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// The top-level harvest configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub repositories: RepositoryConfig,
    pub output: OutputConfig,
}

/// Where and how to talk to the forge.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub accept: String,
    pub user_agent: String,
    pub token: ApiToken,
}

impl ApiConfig {
    pub fn new(token: ApiToken) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token,
        }
    }

    /// Joins `path` onto the base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Which users to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub location: String,
    pub min_followers: u64,
}

impl SearchConfig {
    /// The forge search expression: `location:<loc> followers:>N`.
    pub fn query(&self) -> String {
        format!(
            "location:{} followers:>{}",
            self.location, self.min_followers
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub per_page: u32,
    pub cap: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            cap: MAX_REPOSITORIES_PER_USER,
        }
    }
}

/// Output locations for the two datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub users: PathBuf,
    pub repositories: PathBuf,
    pub delimiter: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            users: PathBuf::from("users.csv"),
            repositories: PathBuf::from("repositories.csv"),
            delimiter: b',',
        }
    }
}

impl HarvestConfig {
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.api.base_url,
            location = %self.search.location,
            min_followers = self.search.min_followers,
            repo_cap = self.repositories.cap,
            users_path = %self.output.users.display(),
            repositories_path = %self.output.repositories.display(),
            "Loaded HarvestConfig"
        );
        debug!(?self, "HarvestConfig loaded (full debug)");
    }
}
