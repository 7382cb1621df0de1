//! Error types shared by the harvest pipeline.
//!
//! Only two kinds of failure stop a run: a successful response whose payload
//! is not JSON or does not match the expected schema, and a failure to write
//! the datasets.
//! Non-success responses and transport failures are stage-local; they are
//! logged and reported through [`crate::paginate::Halt`] or an absent profile.

use std::path::PathBuf;
use thiserror::Error;

/// A request that never produced an HTTP response.
#[derive(Debug, Error)]
#[error("transport error for {url}: {message}")]
pub struct TransportError {
    pub url: String,
    pub message: String,
}

/// Failure reported by a [`crate::contract::ForgeApi`] call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A success response whose body is not JSON.
    #[error("undecodable body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to persist a dataset.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {dataset} dataset to {path}: {source}")]
    Csv {
        dataset: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to flush {dataset} dataset to {path}: {source}")]
    Io {
        dataset: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("malformed {context} payload: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Invalid or incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
