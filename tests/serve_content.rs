mod common;
use crate::common::{init_tracing, SourceTree, TestResult};

use std::fs;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use mergewatch::merge::merge;
use mergewatch::serve::router;
use mergewatch::types::FileSnapshot;

async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn serves_the_merged_bytes_with_validators() -> TestResult {
    init_tracing();

    let tree = SourceTree::new()
        .with_source("first.css", "a{}")
        .with_source("second.css", "b{}");
    let out = tree.root().join("merged.css");
    merge(&tree.sources(), &out)?;

    let response = router(&out).oneshot(get("/")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = FileSnapshot::from_metadata(&fs::metadata(&out)?);
    assert_eq!(
        response.headers().get(header::ETAG).and_then(|v| v.to_str().ok()),
        Some(snapshot.etag().as_str())
    );
    assert!(response.headers().contains_key(header::LAST_MODIFIED));
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"), "got {content_type}");

    assert_eq!(body_bytes(response.into_body()).await, b"a{}b{}");
    Ok(())
}

#[tokio::test]
async fn every_path_serves_the_same_resource() -> TestResult {
    init_tracing();

    let tree = SourceTree::new().with_source("a.css", "x");
    let out = tree.output();
    merge(&tree.sources(), &out)?;

    let response = router(&out).oneshot(get("/styles/whatever.css")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, b"x");
    Ok(())
}

#[tokio::test]
async fn matching_etag_yields_not_modified() -> TestResult {
    init_tracing();

    let tree = SourceTree::new().with_source("a.css", "cached");
    let out = tree.output();
    merge(&tree.sources(), &out)?;
    let etag = FileSnapshot::from_metadata(&fs::metadata(&out)?).etag();

    let request = Request::builder()
        .uri("/")
        .header(header::IF_NONE_MATCH, format!("\"stale\", {etag}"))
        .body(Body::empty())?;
    let response = router(&out).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(body_bytes(response.into_body()).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn stale_etag_gets_fresh_content() -> TestResult {
    init_tracing();

    let tree = SourceTree::new().with_source("a.css", "v1");
    let out = tree.output();
    merge(&tree.sources(), &out)?;
    let first = router(&out).oneshot(get("/")).await?;
    let old_etag = first.headers().get(header::ETAG).cloned();

    tree.append(0, " and v2");
    merge(&tree.sources(), &out)?;

    let mut request = get("/");
    if let Some(etag) = old_etag {
        request.headers_mut().insert(header::IF_NONE_MATCH, etag);
    }
    let response = router(&out).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, b"v1 and v2");
    Ok(())
}

#[tokio::test]
async fn never_built_output_is_not_found() -> TestResult {
    init_tracing();

    let tree = SourceTree::new();
    let response = router(tree.output()).oneshot(get("/")).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
