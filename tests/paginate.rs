use forge_harvest::config::{
    ApiConfig, ApiToken, HarvestConfig, OutputConfig, RepositoryConfig, SearchConfig,
};
use forge_harvest::contract::{ApiRequest, ApiResponse, MockForgeApi};
use forge_harvest::error::{ApiError, HarvestError, TransportError};
use forge_harvest::fetch::{fetch_repositories, search_users};
use forge_harvest::paginate::{Continuation, Halt, PageShape, Paginator};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn test_config() -> HarvestConfig {
    let mut api = ApiConfig::new(ApiToken::new("test-token"));
    api.base_url = "https://forge.test".into();
    HarvestConfig {
        api,
        search: SearchConfig {
            location: "Hyderabad".into(),
            min_followers: 50,
        },
        repositories: RepositoryConfig::default(),
        output: OutputConfig::default(),
    }
}

/// `count` repositories whose names encode the page they came from.
fn repo_page(page: u32, count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                json!({
                    "full_name": format!("octo/p{page}-r{i}"),
                    "created_at": "2020-01-01T00:00:00Z",
                    "stargazers_count": i,
                    "watchers_count": i,
                    "language": null,
                    "has_projects": true,
                    "has_wiki": true,
                    "license": null
                })
            })
            .collect(),
    )
}

#[tokio::test]
async fn numeric_pages_stop_after_short_page() {
    let sizes = [100usize, 100, 37];
    let mut api = MockForgeApi::new();
    api.expect_get().times(3).returning(move |req: ApiRequest| {
        assert_eq!(req.url, "https://forge.test/users/octo/repos");
        assert_eq!(req.query_value("per_page"), Some("100"));
        let page = req.page().expect("page parameter");
        Ok(ApiResponse::ok(repo_page(page, sizes[(page - 1) as usize])))
    });

    let result = fetch_repositories(&api, &test_config(), "octo")
        .await
        .expect("pagination should succeed");

    assert_eq!(result.items.len(), 237);
    assert_eq!(result.requests, 3);
    assert!(result.is_complete());
    assert_eq!(result.items[0].full_name, "octo/p1-r0");
    assert_eq!(result.items[236].full_name, "octo/p3-r36");
}

#[tokio::test]
async fn repository_cap_truncates_after_five_full_pages() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let seen = requested.clone();

    let mut api = MockForgeApi::new();
    api.expect_get().times(5).returning(move |req: ApiRequest| {
        let page = req.page().expect("page parameter");
        seen.lock().unwrap().push(page);
        Ok(ApiResponse::ok(repo_page(page, 100)))
    });

    let result = fetch_repositories(&api, &test_config(), "octo")
        .await
        .expect("pagination should succeed");

    assert_eq!(result.items.len(), 500);
    assert_eq!(result.requests, 5);
    assert_eq!(*requested.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    for (index, repo) in result.items.iter().enumerate() {
        let expected = format!("octo/p{}-r{}", index / 100 + 1, index % 100);
        assert_eq!(repo.full_name, expected);
    }
}

#[tokio::test]
async fn cap_inside_a_page_keeps_a_prefix() {
    let mut api = MockForgeApi::new();
    api.expect_get()
        .times(2)
        .returning(|req: ApiRequest| Ok(ApiResponse::ok(repo_page(req.page().unwrap(), 100))));

    let paginator = Paginator::new(
        Continuation::PageNumber { first_page: 1 },
        PageShape::Array,
        100,
    )
    .with_cap(150);
    let result = paginator
        .collect::<forge_harvest::project::RawRepository, _>(
            &api,
            ApiRequest::new("https://forge.test/users/octo/repos"),
            "repositories",
        )
        .await
        .unwrap();

    assert_eq!(result.items.len(), 150);
    assert_eq!(result.items.last().unwrap().full_name, "octo/p2-r49");
}

#[tokio::test]
async fn failed_page_returns_what_was_accumulated() {
    let mut api = MockForgeApi::new();
    api.expect_get().times(2).returning(|req: ApiRequest| match req.page() {
        Some(1) => Ok(ApiResponse::ok(repo_page(1, 100))),
        _ => Ok(ApiResponse::status(403)),
    });

    let result = fetch_repositories(&api, &test_config(), "octo").await.unwrap();

    assert_eq!(result.items.len(), 100);
    assert_eq!(
        result.halted,
        Some(Halt::Status {
            status: 403,
            url: "https://forge.test/users/octo/repos".into()
        })
    );
}

#[tokio::test]
async fn transport_failure_halts_without_error() {
    let mut api = MockForgeApi::new();
    api.expect_get().times(1).returning(|req: ApiRequest| {
        Err(TransportError {
            url: req.url,
            message: "connection refused".into(),
        }
        .into())
    });

    let result = fetch_repositories(&api, &test_config(), "octo").await.unwrap();

    assert!(result.items.is_empty());
    assert!(matches!(result.halted, Some(Halt::Transport { .. })));
}

#[tokio::test]
async fn search_follows_next_links_until_none() {
    let mut api = MockForgeApi::new();
    api.expect_get().times(3).returning(|req: ApiRequest| match req.url.as_str() {
        "https://forge.test/search/users" => {
            assert_eq!(req.query_value("q"), Some("location:Hyderabad followers:>50"));
            assert_eq!(req.query_value("per_page"), Some("100"));
            Ok(ApiResponse::ok(json!({"total_count": 3, "items": [{"login": "a"}]}))
                .with_next_link("https://forge.test/search/users?page=2"))
        }
        "https://forge.test/search/users?page=2" => {
            assert!(req.query.is_empty(), "next link already carries the query");
            Ok(ApiResponse::ok(json!({"total_count": 3, "items": [{"login": "b"}]}))
                .with_next_link("https://forge.test/search/users?page=3"))
        }
        "https://forge.test/search/users?page=3" => {
            Ok(ApiResponse::ok(json!({"total_count": 3, "items": [{"login": "c"}]})))
        }
        other => panic!("unexpected request {other}"),
    });

    let result = search_users(&api, &test_config()).await.unwrap();
    let logins: Vec<_> = result.items.iter().map(|u| u.login.as_str()).collect();
    assert_eq!(logins, vec!["a", "b", "c"]);
    assert_eq!(result.requests, 3);
}

#[tokio::test]
async fn search_never_requests_the_same_page_twice() {
    let mut api = MockForgeApi::new();
    api.expect_get().times(2).returning(|req: ApiRequest| {
        let body = json!({"total_count": 2, "items": [{"login": "a"}]});
        match req.url.as_str() {
            "https://forge.test/search/users" => {
                Ok(ApiResponse::ok(body).with_next_link("https://forge.test/search/users?page=2"))
            }
            // Misbehaving server points back at the page just served.
            _ => Ok(ApiResponse::ok(body).with_next_link("https://forge.test/search/users?page=2")),
        }
    });

    let result = search_users(&api, &test_config()).await.unwrap();
    assert_eq!(result.requests, 2);
    assert_eq!(result.items.len(), 2);
}

#[tokio::test]
async fn malformed_page_is_a_decode_error() {
    let mut api = MockForgeApi::new();
    api.expect_get()
        .times(1)
        .returning(|_| Ok(ApiResponse::ok(json!([{"full_name": "octo/broken"}]))));

    let err = fetch_repositories(&api, &test_config(), "octo").await.unwrap_err();
    match err {
        HarvestError::Decode { context, .. } => assert_eq!(context, "repositories for octo"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn page_that_is_not_json_is_a_decode_error() {
    let mut api = MockForgeApi::new();
    api.expect_get().times(2).returning(|req: ApiRequest| match req.page() {
        Some(1) => Ok(ApiResponse::ok(repo_page(1, 100))),
        _ => Err(ApiError::Body {
            url: req.url,
            source: serde_json::from_str::<Value>("<html>busy</html>").unwrap_err(),
        }),
    });

    let err = fetch_repositories(&api, &test_config(), "octo")
        .await
        .unwrap_err();
    match err {
        HarvestError::Decode { context, .. } => assert_eq!(context, "repositories for octo"),
        other => panic!("expected decode error, got {other:?}"),
    }
}
