//! High-level pipeline: search → detail → repositories → projection → write.
//!
//! The run is strictly sequential: one request is in flight at any time and
//! the two record collections are only ever appended to by this module.
//!
//! # Error Handling
//! A failed search, detail or repository request ends that stage only; the
//! user is skipped (detail) or kept with whatever repositories were gathered
//! (repositories). A malformed success payload or a failed write aborts the
//! whole run with a [`HarvestError`].
//!
//! # Navigation
//! - Main entrypoint: [`harvest`]
//! - Collection without writing: [`collect`]

use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::contract::{DatasetSink, ForgeApi};
use crate::error::HarvestError;
use crate::fetch::{fetch_repositories, fetch_user, search_users};
use crate::project::{project_repository, project_user, RepositoryRecord, UserRecord};

/// Both datasets, in discovery order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    pub users: Vec<UserRecord>,
    pub repositories: Vec<RepositoryRecord>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectionReport {
    pub users_found: usize,
    pub skipped_logins: Vec<String>,
    pub search_complete: bool,
    /// Logins whose repository listing was cut short by a failed request.
    pub partial_repositories: Vec<String>,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReport {
    pub users_found: usize,
    pub users_written: usize,
    pub skipped_logins: Vec<String>,
    pub partial_repositories: Vec<String>,
    pub repositories_written: usize,
    pub search_complete: bool,
    pub users_path: PathBuf,
    pub repositories_path: PathBuf,
}

/// Run every network stage and accumulate projected records.
pub async fn collect<A>(
    config: &HarvestConfig,
    api: &A,
) -> Result<(Dataset, CollectionReport), HarvestError>
where
    A: ForgeApi + ?Sized,
{
    let search = search_users(api, config).await?;
    let mut dataset = Dataset::default();
    let mut report = CollectionReport {
        users_found: search.items.len(),
        search_complete: search.is_complete(),
        ..CollectionReport::default()
    };

    for stub in &search.items {
        let Some(profile) = fetch_user(api, config, &stub.login).await? else {
            warn!(login = %stub.login, "[HARVEST] Skipping user without details");
            report.skipped_logins.push(stub.login.clone());
            continue;
        };

        dataset.users.push(project_user(&profile));

        let repos = fetch_repositories(api, config, &profile.login).await?;
        if !repos.is_complete() {
            report.partial_repositories.push(profile.login.clone());
        }
        info!(
            login = %profile.login,
            repositories = repos.items.len(),
            "[HARVEST] Collected user"
        );
        dataset.repositories.extend(
            repos
                .items
                .iter()
                .map(|repo| project_repository(&profile.login, repo)),
        );
    }

    Ok((dataset, report))
}

/// Collect everything, then write both datasets once through `sink`.
pub async fn harvest<A, S>(
    config: &HarvestConfig,
    api: &A,
    sink: &S,
) -> Result<HarvestReport, HarvestError>
where
    A: ForgeApi + ?Sized,
    S: DatasetSink + ?Sized,
{
    info!("[HARVEST] Starting harvest pipeline");
    let (dataset, collected) = collect(config, api).await?;

    info!(
        users = dataset.users.len(),
        repositories = dataset.repositories.len(),
        "[HARVEST] Writing datasets"
    );
    let written = sink.write(&dataset.users, &dataset.repositories)?;

    Ok(HarvestReport {
        users_found: collected.users_found,
        users_written: written.users_written,
        skipped_logins: collected.skipped_logins,
        partial_repositories: collected.partial_repositories,
        repositories_written: written.repositories_written,
        search_complete: collected.search_complete,
        users_path: written.users_path,
        repositories_path: written.repositories_path,
    })
}
