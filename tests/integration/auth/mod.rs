//! Authentication boundary tests

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use tower::ServiceExt;

use crate::common::{authed_request, create_test_jwt, parse_body, TestApp};

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = TestApp::new();
    let req = Request::builder()
        .uri("/v1/bookings")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_secret_is_401() {
    let app = TestApp::new();
    let student = app.create_student("Asha Rao");
    let jwt = create_test_jwt(&student, "some-other-secret").unwrap();

    let req = authed_request(Method::GET, "/v1/bookings", &jwt, None);
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_account_is_401() {
    let app = TestApp::new();
    let student = app.create_student("Asha Rao");
    let mut ghost = student.clone();
    ghost.id = uuid::Uuid::new_v4();

    let resp = app.send(&ghost, Method::GET, "/v1/bookings", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = parse_body(resp).await;
    assert!(body["error"]["message"].is_string());
}
