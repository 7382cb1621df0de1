//! Field projection: raw forge payloads in, flat dataset records out.
//!
//! Payload structs spell out which fields are optional. Required fields that
//! are missing make deserialization fail rather than defaulting, so a short
//! payload can never silently become a row of zeros.

use serde::{Deserialize, Serialize};

/// A search hit; only the login is needed to drive the detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserStub {
    pub login: String,
}

/// `GET /users/{login}` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: String,
}

/// One element of `GET /users/{login}/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRepository {
    pub full_name: String,
    pub created_at: String,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub license: Option<LicenseRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LicenseRef {
    pub name: String,
}

/// A row of the users dataset. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub login: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: String,
}

impl UserRecord {
    pub const COLUMNS: [&'static str; 11] = [
        "login",
        "name",
        "company",
        "location",
        "email",
        "hireable",
        "bio",
        "public_repos",
        "followers",
        "following",
        "created_at",
    ];
}

/// A row of the repositories dataset. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRecord {
    pub login: String,
    pub full_name: String,
    pub created_at: String,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub license_name: Option<String>,
}

impl RepositoryRecord {
    pub const COLUMNS: [&'static str; 9] = [
        "login",
        "full_name",
        "created_at",
        "stargazers_count",
        "watchers_count",
        "language",
        "has_projects",
        "has_wiki",
        "license_name",
    ];
}

/// Trim, drop every `@`, upper-case. Absent stays absent.
pub fn clean_company_name(company: Option<&str>) -> Option<String> {
    company.map(|c| c.trim().replace('@', "").to_uppercase())
}

pub fn project_user(profile: &UserProfile) -> UserRecord {
    UserRecord {
        login: profile.login.clone(),
        name: profile.name.clone(),
        company: clean_company_name(profile.company.as_deref()),
        location: profile.location.clone(),
        email: profile.email.clone(),
        hireable: profile.hireable,
        bio: profile.bio.clone(),
        public_repos: profile.public_repos,
        followers: profile.followers,
        following: profile.following,
        created_at: profile.created_at.clone(),
    }
}

pub fn project_repository(owner: &str, repo: &RawRepository) -> RepositoryRecord {
    RepositoryRecord {
        login: owner.to_string(),
        full_name: repo.full_name.clone(),
        created_at: repo.created_at.clone(),
        stargazers_count: repo.stargazers_count,
        watchers_count: repo.watchers_count,
        language: repo.language.clone(),
        has_projects: repo.has_projects,
        has_wiki: repo.has_wiki,
        license_name: repo.license.as_ref().map(|l| l.name.clone()),
    }
}
