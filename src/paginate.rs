//! Generic pagination over [`ForgeApi`].
//!
//! A [`Paginator`] turns a run of paged responses into one ordered sequence,
//! concatenating pages in the order they were fetched. It is parameterised by
//! how the next page is found ([`Continuation`]), how items sit in the body
//! ([`PageShape`]) and an optional item cap.
//!
//! Non-success responses and transport failures end pagination early; the
//! items gathered so far are returned together with the [`Halt`] reason.
//! A successful page that is not JSON, or does not decode into `T`, is a hard
//! [`HarvestError::Decode`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, error, warn};

use crate::contract::{ApiRequest, ForgeApi};
use crate::error::{ApiError, HarvestError};

/// How to find the page after the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Follow the absolute `next` URL from the response metadata.
    FollowLink,
    /// Increment the `page` query parameter until a short page comes back.
    PageNumber { first_page: u32 },
}

/// Where the items live in a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    /// `{"total_count": .., "items": [..]}` as returned by search endpoints.
    SearchItems,
    /// A bare JSON array.
    Array,
}

#[derive(Deserialize)]
struct SearchPage<T> {
    items: Vec<T>,
}

impl PageShape {
    fn decode<T: DeserializeOwned>(
        self,
        body: serde_json::Value,
    ) -> Result<Vec<T>, serde_json::Error> {
        match self {
            PageShape::SearchItems => {
                serde_json::from_value::<SearchPage<T>>(body).map(|p| p.items)
            }
            PageShape::Array => serde_json::from_value(body),
        }
    }
}

/// Why pagination stopped before the source was exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Status { status: u16, url: String },
    Transport { url: String, message: String },
}

/// Items gathered by one pagination run.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Number of requests issued.
    pub requests: usize,
    /// Set when a failed request cut the run short.
    pub halted: Option<Halt>,
}

impl<T> Paginated<T> {
    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    pub continuation: Continuation,
    pub shape: PageShape,
    pub per_page: u32,
    pub cap: Option<usize>,
}

impl Paginator {
    pub fn new(continuation: Continuation, shape: PageShape, per_page: u32) -> Self {
        Self {
            continuation,
            shape,
            per_page,
            cap: None,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Fetch every page reachable from `request`. `context` names the
    /// collection in logs and errors.
    pub async fn collect<T, A>(
        &self,
        api: &A,
        request: ApiRequest,
        context: &str,
    ) -> Result<Paginated<T>, HarvestError>
    where
        T: DeserializeOwned,
        A: ForgeApi + ?Sized,
    {
        let mut items: Vec<T> = Vec::new();
        let mut requests = 0usize;
        let mut halted = None;
        let mut requested: HashSet<ApiRequest> = HashSet::new();

        let mut first = request.with_query("per_page", self.per_page);
        if let Continuation::PageNumber { first_page } = self.continuation {
            first = first.with_query("page", first_page);
        }
        let mut next = Some(first);

        while let Some(current) = next.take() {
            if self.cap.is_some_and(|cap| items.len() >= cap) {
                break;
            }
            if !requested.insert(current.clone()) {
                warn!(
                    context,
                    url = %current.url,
                    "Next page repeats an earlier request, stopping"
                );
                break;
            }

            requests += 1;
            let response = match api.get(current.clone()).await {
                Ok(response) => response,
                Err(ApiError::Transport(e)) => {
                    error!(
                        context,
                        url = %e.url,
                        error = %e.message,
                        "Request failed, aborting pagination"
                    );
                    halted = Some(Halt::Transport {
                        url: e.url,
                        message: e.message,
                    });
                    break;
                }
                Err(ApiError::Body { source, .. }) => {
                    return Err(HarvestError::Decode {
                        context: context.to_string(),
                        source,
                    });
                }
            };

            if !response.is_success() {
                error!(
                    context,
                    status = response.status,
                    url = %current.url,
                    "Error fetching page, aborting pagination"
                );
                halted = Some(Halt::Status {
                    status: response.status,
                    url: current.url,
                });
                break;
            }

            let page: Vec<T> = self
                .shape
                .decode(response.body)
                .map_err(|source| HarvestError::Decode {
                    context: context.to_string(),
                    source,
                })?;
            let page_len = page.len();
            items.extend(page);
            debug!(context, page_len, total = items.len(), "Fetched page");

            if let Some(cap) = self.cap {
                if items.len() >= cap {
                    items.truncate(cap);
                    break;
                }
            }

            next = match self.continuation {
                Continuation::FollowLink => response.next_link.map(ApiRequest::new),
                Continuation::PageNumber { first_page } => {
                    if page_len < self.per_page as usize {
                        None
                    } else {
                        let page = current.page().unwrap_or(first_page) + 1;
                        Some(current.with_query("page", page))
                    }
                }
            };
        }

        Ok(Paginated {
            items,
            requests,
            halted,
        })
    }
}
