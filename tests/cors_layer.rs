mod common;

use axum::{
    body::Body,
    http::{Request, header},
};
use tower::ServiceExt;

use common::TestApp;

#[tokio::test]
async fn default_config_allows_any_origin_on_api_routes() {
    let app = TestApp::new();
    let req = Request::builder()
        .method("GET")
        .uri("/api/photo/0000000000000000/stylize/sepia")
        .header(header::ORIGIN, "https://gallery.example")
        .body(Body::empty())
        .expect("build request");
    let resp = app.router.clone().oneshot(req).await.expect("call app");

    let allow_origin = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .expect("missing allow origin")
        .to_str()
        .expect("invalid allow origin");
    assert_eq!(allow_origin, "*");
}

#[tokio::test]
async fn upload_preflight_allows_post_with_content_type() {
    let app = TestApp::new();
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/photo/upload")
        .header(header::ORIGIN, "https://gallery.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("build request");
    let resp = app.router.clone().oneshot(req).await.expect("call app");

    let allow_methods = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .expect("missing allow methods")
        .to_str()
        .expect("invalid allow methods");
    assert!(allow_methods.contains("POST"));

    let allow_headers = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .expect("missing allow headers")
        .to_str()
        .expect("invalid allow headers");
    assert!(allow_headers.contains("content-type"));
}
