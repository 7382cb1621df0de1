//! The three network stages: user search, profile detail, repository listing.

use tracing::{error, info, warn};

use crate::config::{HarvestConfig, MAX_PER_PAGE};
use crate::contract::{ApiRequest, ForgeApi};
use crate::error::{ApiError, HarvestError};
use crate::paginate::{Continuation, PageShape, Paginated, Paginator};
use crate::project::{RawRepository, UserProfile, UserStub};

/// Search for users matching the configured location and follower threshold.
///
/// Follows `next` links until the forge stops advertising one; the forge's own
/// result-set limit is the only bound.
pub async fn search_users<A>(
    api: &A,
    config: &HarvestConfig,
) -> Result<Paginated<UserStub>, HarvestError>
where
    A: ForgeApi + ?Sized,
{
    let query = config.search.query();
    info!(query = %query, "[SEARCH] Searching users");

    let request = ApiRequest::new(config.api.endpoint("search/users")).with_query("q", &query);
    let paginator = Paginator::new(
        Continuation::FollowLink,
        PageShape::SearchItems,
        MAX_PER_PAGE,
    );
    let result = paginator.collect(api, request, "user search").await?;

    info!(
        users = result.items.len(),
        requests = result.requests,
        complete = result.is_complete(),
        "[SEARCH] Search finished"
    );
    Ok(result)
}

/// Fetch one user's full profile.
///
/// Only `200 OK` yields a profile. Every other status, and transport failure,
/// yields `None` so the caller can skip the user. A success body that does not
/// decode into a profile is a [`HarvestError::Decode`].
pub async fn fetch_user<A>(
    api: &A,
    config: &HarvestConfig,
    login: &str,
) -> Result<Option<UserProfile>, HarvestError>
where
    A: ForgeApi + ?Sized,
{
    let context = || format!("user profile for {login}");
    let request = ApiRequest::new(config.api.endpoint(&format!("users/{login}")));
    let response = match api.get(request).await {
        Ok(response) => response,
        Err(ApiError::Transport(e)) => {
            error!(login, url = %e.url, error = %e.message, "[DETAIL] Request failed");
            return Ok(None);
        }
        Err(ApiError::Body { source, .. }) => {
            return Err(HarvestError::Decode {
                context: context(),
                source,
            });
        }
    };

    if response.status != 200 {
        warn!(login, status = response.status, "[DETAIL] Error fetching user details");
        return Ok(None);
    }

    serde_json::from_value(response.body)
        .map(Some)
        .map_err(|source| HarvestError::Decode {
            context: context(),
            source,
        })
}

/// List up to `config.repositories.cap` repositories owned by `login`.
pub async fn fetch_repositories<A>(
    api: &A,
    config: &HarvestConfig,
    login: &str,
) -> Result<Paginated<RawRepository>, HarvestError>
where
    A: ForgeApi + ?Sized,
{
    let request = ApiRequest::new(config.api.endpoint(&format!("users/{login}/repos")));
    let paginator = Paginator::new(
        Continuation::PageNumber { first_page: 1 },
        PageShape::Array,
        config.repositories.per_page,
    )
    .with_cap(config.repositories.cap);

    let context = format!("repositories for {login}");
    let result = paginator.collect(api, request, &context).await?;
    if let Some(halt) = &result.halted {
        error!(login, ?halt, kept = result.items.len(), "[REPOS] Error fetching repos");
    }
    Ok(result)
}
