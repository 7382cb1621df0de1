//! `load_config`: reads the static YAML config and injects the API token from
//! the environment, producing a validated [`HarvestConfig`].
//!
//! The YAML file never carries secrets. `GITHUB_TOKEN` must be set (a `.env`
//! file loaded by the binary counts).
//!
//! ```yaml
//! search:
//!   location: Hyderabad
//!   min_followers: 50
//! output:
//!   users: out/users.csv
//!   repositories: out/repositories.csv
//! ```
//!
//! Every section other than `search` is optional and falls back to defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::{
    ApiConfig, ApiToken, HarvestConfig, OutputConfig, RepositoryConfig, SearchConfig,
    DEFAULT_ACCEPT, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, MAX_PER_PAGE, MAX_REPOSITORIES_PER_USER,
};
use crate::error::ConfigError;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    api: ApiSection,
    search: SearchSection,
    #[serde(default)]
    repositories: RepositoriesSection,
    #[serde(default)]
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSection {
    base_url: Option<String>,
    accept: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSection {
    location: String,
    min_followers: u64,
}

#[derive(Debug, Default, Deserialize)]
struct RepositoriesSection {
    per_page: Option<u32>,
    cap: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSection {
    users: Option<PathBuf>,
    repositories: Option<PathBuf>,
    delimiter: Option<String>,
}

/// Loads a static YAML config file and injects the token from `GITHUB_TOKEN`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HarvestConfig, ConfigError> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(ConfigError::Read {
                path: path_ref.to_path_buf(),
                source: e,
            });
        }
    };

    let raw: FileConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(ConfigError::Parse(e));
        }
    };

    let token = match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            info!("{TOKEN_ENV} found in env");
            ApiToken::new(token.trim())
        }
        _ => {
            error!("{TOKEN_ENV} environment variable not set");
            return Err(ConfigError::MissingEnv(TOKEN_ENV));
        }
    };

    let config = HarvestConfig {
        api: ApiConfig {
            base_url: raw.api.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            accept: raw.api.accept.unwrap_or_else(|| DEFAULT_ACCEPT.into()),
            user_agent: raw.api.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            token,
        },
        search: SearchConfig {
            location: raw.search.location,
            min_followers: raw.search.min_followers,
        },
        repositories: repositories_config(raw.repositories)?,
        output: output_config(raw.output)?,
    };

    validate(&config)?;
    config.trace_loaded();
    Ok(config)
}

fn repositories_config(section: RepositoriesSection) -> Result<RepositoryConfig, ConfigError> {
    let defaults = RepositoryConfig::default();
    let per_page = section.per_page.unwrap_or(defaults.per_page);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(ConfigError::Invalid {
            field: "repositories.per_page",
            reason: format!("must be between 1 and {MAX_PER_PAGE}, got {per_page}"),
        });
    }

    let cap = section.cap.unwrap_or(defaults.cap);
    if !(1..=MAX_REPOSITORIES_PER_USER).contains(&cap) {
        return Err(ConfigError::Invalid {
            field: "repositories.cap",
            reason: format!("must be between 1 and {MAX_REPOSITORIES_PER_USER}, got {cap}"),
        });
    }

    Ok(RepositoryConfig { per_page, cap })
}

fn output_config(section: OutputSection) -> Result<OutputConfig, ConfigError> {
    let defaults = OutputConfig::default();
    let delimiter = match section.delimiter.as_deref() {
        None => defaults.delimiter,
        Some(d) if d.len() == 1 && d.is_ascii() => d.as_bytes()[0],
        Some(other) => {
            return Err(ConfigError::Invalid {
                field: "output.delimiter",
                reason: format!("must be a single ASCII character, got {other:?}"),
            })
        }
    };

    Ok(OutputConfig {
        users: section.users.unwrap_or(defaults.users),
        repositories: section.repositories.unwrap_or(defaults.repositories),
        delimiter,
    })
}

fn validate(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.search.location.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "search.location",
            reason: "must not be empty".into(),
        });
    }
    if config.output.users == config.output.repositories {
        return Err(ConfigError::Invalid {
            field: "output",
            reason: "users and repositories must be written to different files".into(),
        });
    }
    Ok(())
}
