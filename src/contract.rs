//! # contract: seams between the pipeline and the outside world
//!
//! Two traits isolate the pipeline from I/O:
//! - [`ForgeApi`] issues authenticated GET requests against the forge and
//!   hands back status, parsed JSON body and the next-page link.
//! - [`DatasetSink`] persists the two accumulated record collections once.
//!
//! Both are annotated for `mockall`, so tests (including the integration
//! tests under `tests/`, via the default `test-export-mocks` feature) can
//! drive the pipeline deterministically.

use async_trait::async_trait;
use mockall::automock;
use std::path::PathBuf;

use crate::error::{ApiError, SinkError};
use crate::project::{RepositoryRecord, UserRecord};

/// A GET request: absolute URL plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Sets `key`, replacing any existing value for it.
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.query.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.query.push((key.to_string(), value)),
        }
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The numeric `page` parameter, if set.
    pub fn page(&self) -> Option<u32> {
        self.query_value("page").and_then(|p| p.parse().ok())
    }
}

/// What the adapter hands back for any completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` for non-success responses.
    pub body: serde_json::Value,
    /// Absolute URL of the `rel="next"` page, if the response advertised one.
    pub next_link: Option<String>,
}

impl ApiResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body,
            next_link: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: serde_json::Value::Null,
            next_link: None,
        }
    }

    pub fn with_next_link(mut self, url: impl Into<String>) -> Self {
        self.next_link = Some(url.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated read access to the forge API.
///
/// Implementations attach credentials and version headers themselves; callers
/// only describe the endpoint and query.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ForgeApi: Send + Sync {
    /// Perform one GET. `Err` when no HTTP response was obtained at all, or
    /// when a success response carried a body that is not JSON.
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Summary of a completed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub users_path: PathBuf,
    pub users_written: usize,
    pub repositories_path: PathBuf,
    pub repositories_written: usize,
}

/// Destination for the two flattened datasets. Called exactly once per run.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait DatasetSink: Send + Sync {
    fn write(
        &self,
        users: &[UserRecord],
        repositories: &[RepositoryRecord],
    ) -> Result<WriteReport, SinkError>;
}
