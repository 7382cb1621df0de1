//! reqwest-backed [`ForgeApi`] implementation.
//!
//! The client is built once from [`ApiConfig`]; credentials, the API version
//! media type and the user agent travel as default headers on every request.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::Client;

use crate::config::ApiConfig;
use crate::contract::{ApiRequest, ApiResponse, ForgeApi};
use crate::error::{ApiError, ConfigError, TransportError};

pub struct ForgeClient {
    http: Client,
}

impl ForgeClient {
    pub fn new(api: &ApiConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("api.accept", &api.accept)?);
        headers.insert(USER_AGENT, header_value("api.user_agent", &api.user_agent)?);
        let mut auth = header_value(
            "GITHUB_TOKEN",
            &format!("Bearer {}", api.token.expose()),
        )?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "api",
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        tracing::info!(base_url = %api.base_url, "Initialized ForgeClient");
        Ok(Self { http })
    }
}

fn header_value(field: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::Invalid {
        field,
        reason: e.to_string(),
    })
}

#[async_trait]
impl ForgeApi for ForgeClient {
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let transport = |e: reqwest::Error| TransportError {
            url: request.url.clone(),
            message: e.to_string(),
        };

        tracing::debug!(url = %request.url, query = ?request.query, "GET");
        let response = self
            .http
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let next_link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);

        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::debug!(
                status = %status,
                url = %request.url,
                body = %text,
                "Non-success response body"
            );
            return Ok(ApiResponse {
                status: status.as_u16(),
                body: serde_json::Value::Null,
                next_link,
            });
        }

        let text = response.text().await.map_err(transport)?;
        let body = serde_json::from_str(&text).map_err(|source| ApiError::Body {
            url: request.url.clone(),
            source,
        })?;

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            next_link,
        })
    }
}

/// Extract the `rel="next"` URL from a `Link` header.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/search/users?q=x&page=2>; rel="next", <...&page=10>; rel="last"`
pub fn parse_next_link(link_header: &str) -> Option<String> {
    for part in link_header.split(',') {
        let mut url = None;
        let mut is_next = false;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel) = segment.strip_prefix("rel=") {
                is_next = rel.trim_matches('"').split_whitespace().any(|r| r == "next");
            }
        }

        if let (Some(url), true) = (url, is_next) {
            return Some(url.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiToken;

    #[test]
    fn test_parse_next_link_full_header() {
        let header = r#"<https://api.github.com/search/users?q=location%3AHyderabad&per_page=100&page=2>; rel="next", <https://api.github.com/search/users?q=location%3AHyderabad&per_page=100&page=10>; rel="last""#;
        assert_eq!(
            parse_next_link(header).as_deref(),
            Some("https://api.github.com/search/users?q=location%3AHyderabad&per_page=100&page=2")
        );
    }

    #[test]
    fn test_parse_next_link_on_last_page() {
        let header = r#"<https://api.github.com/search/users?page=9>; rel="prev", <https://api.github.com/search/users?page=1>; rel="first""#;
        assert_eq!(parse_next_link(header), None);
    }

    #[test]
    fn test_parse_next_link_empty() {
        assert_eq!(parse_next_link(""), None);
    }

    #[test]
    fn rejects_token_that_is_not_a_header_value() {
        let api = ApiConfig::new(ApiToken::new("bad\ntoken"));
        let err = ForgeClient::new(&api).err().expect("must fail");
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }
}
