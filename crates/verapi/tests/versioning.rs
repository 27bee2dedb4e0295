//! Versioning rules: partitioning, defaults, ordering and configuration errors

use verapi::prelude::*;
use verapi::{TestClient, VersionTag};

async fn list_cookies() -> &'static str {
    "cookies"
}

async fn get_cookie(Path(id): Path<u32>) -> String {
    format!("cookie {}", id)
}

async fn health() -> &'static str {
    "ok"
}

fn bakery() -> App {
    App::new()
        .route("/cookies", get(version([1, 2], list_cookies)))
        .route("/cookies/{id}", get(version([1], get_cookie)))
}

fn customized() -> VersioningConfig {
    VersioningConfig::new()
        .default_version(2)
        .prefix_format("/version{version}")
        .include_all_routes(false)
}

#[tokio::test]
async fn routes_appear_only_under_their_versions() {
    let mut app = bakery();
    let versions = app.versionize(customized()).unwrap();
    assert_eq!(versions, ["1", "2"]);

    let client = TestClient::new(app);
    client.get("/version1/cookies").await.assert_status(200);
    client.get("/version2/cookies").await.assert_status(200);
    client
        .get("/version1/cookies/7")
        .await
        .assert_status(200)
        .assert_body_contains("cookie 7");
    client.get("/version2/cookies/7").await.assert_status(404);
    client.get("/cookies").await.assert_status(404);
}

#[tokio::test]
async fn docs_page_lists_one_entry_per_version() {
    let mut app = bakery();
    app.versionize(customized()).unwrap();
    let client = TestClient::new(app);

    let html = client.get("/docs").await.text();
    assert!(html.contains(r#"{"name":"Version 1","url":"/version1/openapi.json"}"#));
    assert!(html.contains(r#"{"name":"Version 2","url":"/version2/openapi.json"}"#));
    assert!(!html.contains("All Routes"));
}

#[test]
fn versions_sort_as_strings() {
    let mut app = App::new()
        .route("/a", get(version([2], list_cookies)))
        .route("/b", get(version([1], list_cookies)))
        .route("/c", get(version([10], list_cookies)));

    let versions = app.versionize(VersioningConfig::default()).unwrap();
    assert_eq!(versions, ["1", "10", "2"]);
}

#[tokio::test]
async fn untagged_routes_join_the_default_version() {
    let mut app = App::new().route("/cake", get(list_cookies));
    assert_eq!(app.versionize(VersioningConfig::default()).unwrap(), ["1"]);

    let client = TestClient::new(app);
    client.get("/v1/cake").await.assert_status(200);
    client.get("/cake").await.assert_status(404);
}

#[tokio::test]
async fn untagged_routes_stay_without_default_version() {
    let mut app = App::new()
        .route("/cake", get(list_cookies))
        .route("/cookies", get(version([3], list_cookies)));
    let versions = app
        .versionize(VersioningConfig::new().no_default_version())
        .unwrap();
    assert_eq!(versions, ["3"]);

    let client = TestClient::new(app);
    client.get("/cake").await.assert_status(200);
    client.get("/v3/cookies").await.assert_status(200);
    client.get("/v1/cake").await.assert_status(404);
}

#[tokio::test]
async fn unversioned_routes_are_left_alone() {
    let mut app = bakery().route("/health", get(unversioned(health)));
    app.versionize(VersioningConfig::default()).unwrap();
    let client = TestClient::new(app);

    client.get("/health").await.assert_status(200);
    client.get("/v1/health").await.assert_status(404);

    for url in ["/v1/openapi.json", "/v2/openapi.json"] {
        let doc: serde_json::Value = client.get(url).await.json().unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(!paths.keys().any(|path| path.ends_with("/health")), "{}", url);
    }

    let all: serde_json::Value = client.get("/openapi.json").await.json().unwrap();
    assert!(all["paths"].get("/health").is_some());
}

#[tokio::test]
async fn routes_can_be_tagged_by_registration_token() {
    let mut app = App::new();
    let ids = app.router_mut().add_route("/cake", get(list_cookies));
    app.router_mut()
        .set_version(ids[0], VersionTag::labels(["beta"]));

    assert_eq!(app.versionize(VersioningConfig::default()).unwrap(), ["beta"]);
    TestClient::new(app)
        .get("/vbeta/cake")
        .await
        .assert_status(200);
}

#[tokio::test]
async fn documents_are_deterministic() {
    async fn fetch() -> (Vec<u8>, Vec<u8>) {
        let mut app = bakery().tag(Tag::new("Cookies")).tag(Tag::new("Cake"));
        app.versionize(VersioningConfig::new().filter_tags(true)).unwrap();
        let client = TestClient::new(app);
        (
            client.get("/v1/openapi.json").await.body().to_vec(),
            client.get("/openapi.json").await.body().to_vec(),
        )
    }

    let first = fetch().await;
    let second = fetch().await;
    assert_eq!(first, second);
}

#[test]
fn versioning_twice_is_rejected() {
    let mut app = bakery();
    app.versionize(VersioningConfig::default()).unwrap();

    let err = app.versionize(VersioningConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::AlreadyVersioned));
}

#[test]
fn prefix_without_placeholder_is_rejected() {
    for format in ["/api", "/v{{version}}", "/v{version}/", "v{version}"] {
        let mut app = bakery();
        let err = app
            .versionize(VersioningConfig::new().prefix_format(format))
            .unwrap_err();

        assert!(
            matches!(err, BuildError::InvalidPrefixFormat { .. }),
            "format {:?}",
            format
        );
        assert!(!app.is_versioned());
        assert_eq!(app.router().routes().len(), 2);
    }
}

#[tokio::test]
async fn configuration_loads_from_variables() {
    let config = VersioningConfig::from_vars([
        ("VERAPI_PREFIX_FORMAT".to_string(), "/api/v{version}".to_string()),
        ("VERAPI_DEFAULT_VERSION".to_string(), "none".to_string()),
    ])
    .unwrap();

    let mut app = bakery().route("/health", get(health));
    app.versionize(config).unwrap();

    let client = TestClient::new(app);
    client.get("/api/v2/cookies").await.assert_status(200);
    client.get("/health").await.assert_status(200);
}
