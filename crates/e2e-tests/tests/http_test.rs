//! HTTP surface E2E tests for markdump.
//!
//! Drives the full router with in-process requests: access gate, page
//! routing, pass-through files, the query API and reload.

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use e2e_tests::{
    body_bytes, body_text, get, get_with_cookie, router_with_tokens, TestHarness, TEST_TOKEN,
};

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let harness = TestHarness::new();
    let site = harness.site();

    for uri in ["/", "/guides", "/guides/getting-started", "/search?q=fox", "/?s=fox"] {
        let response = harness.router(site.clone()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = harness
        .router(site)
        .oneshot(get_with_cookie("/", "wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_flow_query_then_cookie() {
    let harness = TestHarness::new();
    let site = harness.site();

    let response = harness
        .router(site.clone())
        .oneshot(get("/guides?token=secret1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        cookie,
        "markdump_token=secret1; Max-Age=2592000; Path=/; Secure; HttpOnly; SameSite=Strict"
    );

    let response = harness
        .router(site)
        .oneshot(get_with_cookie("/guides", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_sentinel_bypasses_gate() {
    let harness = TestHarness::new();
    let router = router_with_tokens(harness.site(), "public");

    let response = router.oneshot(get("/guides/getting-started")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<h1>Getting Started</h1>"));
}

#[tokio::test]
async fn test_pages_and_case_insensitive_routing() {
    let harness = TestHarness::new();
    let site = harness.site();

    let response = harness
        .router(site.clone())
        .oneshot(get_with_cookie("/", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Café Notes"));
    assert!(body.contains("Guides"));
    assert!(body.contains("Home Page"));

    let response = harness
        .router(site)
        .oneshot(get_with_cookie("/GUIDES/Getting-Started", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("The quick brown fox"));
    assert!(body.contains(r#"<a href="/guides">Guides</a>"#));
}

#[tokio::test]
async fn test_pass_through_file() {
    let harness = TestHarness::new();
    let response = harness
        .router(harness.site())
        .oneshot(get_with_cookie("/guides/diagram.svg", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
    assert_eq!(
        body_bytes(response).await,
        b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec()
    );
}

#[tokio::test]
async fn test_not_found_and_too_long() {
    let harness = TestHarness::new();
    let site = harness.site();

    for uri in ["/missing.txt", "/.git/config", "/guides/a/b", "/guides/advanced/.."] {
        let response = harness
            .router(site.clone())
            .oneshot(get_with_cookie(uri, TEST_TOKEN))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }

    let long = "/guides".repeat(17);
    let response = harness
        .router(site)
        .oneshot(get_with_cookie(&long, TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_query_api() {
    let harness = TestHarness::new();
    let response = harness
        .router(harness.site())
        .oneshot(get_with_cookie("/search?q=JUMPS", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        value,
        json!([{
            "href": "/guides/getting-started",
            "path": "Home / Guides / ",
            "name": "Getting Started",
            "content": "# Getting Started\n\nThe quick brown fox <mark>jumps</mark> over the lazy dog."
        }])
    );
}

#[tokio::test]
async fn test_query_api_empty_input() {
    let harness = TestHarness::new();
    let response = harness
        .router(harness.site())
        .oneshot(get_with_cookie("/search?q=", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "[]");
}

#[tokio::test]
async fn test_search_page() {
    let harness = TestHarness::new();
    let response = harness
        .router(harness.site())
        .oneshot(get_with_cookie("/guides/advanced?s=coordinator", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Search: coordinator"));
    assert!(body.contains("<mark>coordinator</mark>"));
}

#[tokio::test]
async fn test_reload_endpoint() {
    let harness = TestHarness::new();
    let site = harness.site();

    let response = harness
        .router(site.clone())
        .oneshot(get("/reload?secret=nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    harness.write("Changelog.md", "Version two");
    let response = harness
        .router(site.clone())
        .oneshot(get("/reload?secret=reload-secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "reloaded version 2");

    let response = harness
        .router(site)
        .oneshot(get_with_cookie("/changelog", TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
