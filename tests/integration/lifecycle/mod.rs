//! Booking lifecycle transitions over HTTP

use axum::http::{Method, StatusCode};
use eklavya_directory::AccountProfile;
use serde_json::{json, Value};

use crate::common::{parse_body, TestApp};

struct Parties {
    app: TestApp,
    student: AccountProfile,
    scribe: AccountProfile,
    id: String,
}

async fn pending_booking() -> Parties {
    let app = TestApp::new();
    let student = app.create_student("Asha Rao");
    let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

    let resp = app
        .send(
            &student,
            Method::POST,
            "/v1/bookings",
            Some(json!({
                "scribe_id": scribe.id,
                "exam_date": "2026-10-27T10:00:00Z",
                "subject": "Economics HL",
                "venue": "Hall A",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = parse_body(resp).await["id"].as_str().unwrap().to_string();

    Parties {
        app,
        student,
        scribe,
        id,
    }
}

impl Parties {
    async fn act(
        &self,
        who: &AccountProfile,
        action: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let resp = self
            .app
            .send(
                who,
                Method::POST,
                &format!("/v1/bookings/{}/{}", self.id, action),
                body,
            )
            .await;
        let status = resp.status();
        (status, parse_body(resp).await)
    }

    async fn stored(&self) -> Value {
        let resp = self
            .app
            .send(
                &self.student,
                Method::GET,
                &format!("/v1/bookings/{}", self.id),
                None,
            )
            .await;
        parse_body(resp).await
    }
}

#[tokio::test]
async fn test_confirm_then_complete() {
    let p = pending_booking().await;

    let (status, body) = p.act(&p.scribe, "confirm", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["confirmedBy"], p.scribe.id.to_string());
    assert_eq!(body["confirmedAt"], "2026-10-21T10:00:00Z");
    assert_eq!(body["version"], 2);

    let (status, body) = p.act(&p.scribe, "complete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["completedBy"], p.scribe.id.to_string());
}

#[tokio::test]
async fn test_confirm_twice_is_409() {
    let p = pending_booking().await;
    p.act(&p.scribe, "confirm", None).await;

    let (status, body) = p.act(&p.scribe, "confirm", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    assert_eq!(
        body["error"]["message"],
        "Booking is confirmed and cannot be confirmed"
    );
}

#[tokio::test]
async fn test_reject_with_reason_then_confirm_fails() {
    let p = pending_booking().await;

    let (status, body) = p
        .act(
            &p.scribe,
            "reject",
            Some(json!({"reason": "Schedule conflict"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["rejectionReason"], "Schedule conflict");

    let (status, body) = p.act(&p.scribe, "confirm", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"]["message"],
        "Booking is already rejected and cannot be confirmed"
    );
}

#[tokio::test]
async fn test_reject_without_reason_stores_placeholder() {
    let p = pending_booking().await;
    let (_, body) = p.act(&p.scribe, "reject", None).await;
    assert_eq!(body["rejectionReason"], "No reason provided");
}

#[tokio::test]
async fn test_student_cannot_confirm_and_record_unchanged() {
    let p = pending_booking().await;
    let before = p.stored().await;

    let (status, body) = p.act(&p.student, "confirm", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"]["message"],
        "Not authorized to confirm this booking"
    );
    assert_eq!(p.stored().await, before);
}

#[tokio::test]
async fn test_other_scribe_is_forbidden() {
    let p = pending_booking().await;
    let other = p.app.create_scribe("Ravi Kumar", None, &[]).await.unwrap();

    for action in ["confirm", "reject", "complete", "cancel"] {
        let (status, _) = p.act(&other, action, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{action}");
    }
    assert_eq!(p.stored().await["status"], "pending");
}

#[tokio::test]
async fn test_either_party_cancels() {
    let p = pending_booking().await;
    let (status, body) = p
        .act(&p.student, "cancel", Some(json!({"reason": "Exam postponed"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["cancelledBy"], p.student.id.to_string());
    assert_eq!(body["cancellationReason"], "Exam postponed");

    let q = pending_booking().await;
    q.act(&q.scribe, "confirm", None).await;
    let (status, body) = q.act(&q.scribe, "cancel", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, _) = q.act(&q.student, "cancel", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_stale_expected_version_is_409_conflict() {
    let p = pending_booking().await;
    p.act(&p.scribe, "confirm", None).await;

    let (status, body) = p
        .act(&p.student, "cancel", Some(json!({"expected_version": 1})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(p.stored().await["status"], "confirmed");

    let (status, _) = p
        .act(&p.student, "cancel", Some(json!({"expected_version": 2})))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_action_is_404() {
    let p = pending_booking().await;
    let (status, body) = p.act(&p.scribe, "approve", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_transition_on_missing_booking_is_404() {
    let p = pending_booking().await;
    let resp = p
        .app
        .send(
            &p.scribe,
            Method::POST,
            &format!("/v1/bookings/{}/confirm", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
