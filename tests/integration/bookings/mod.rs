//! Booking creation, reads and listing views

use axum::http::{Method, StatusCode};
use chrono::Duration;
use eklavya_directory::AccountProfile;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{parse_body, test_now, TestApp};

fn booking_body(scribe_id: Uuid, exam_date: &str) -> Value {
    json!({
        "scribe_id": scribe_id,
        "exam_date": exam_date,
        "subject": "Economics HL",
        "board": "IB",
        "venue": "Hall A",
    })
}

mod test_create_booking {
    use super::*;

    #[tokio::test]
    async fn test_create_booking_returns_201_pending() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

        let resp = app
            .send(
                &student,
                Method::POST,
                "/v1/bookings",
                Some(booking_body(scribe.id, "2026-10-27T10:00:00Z")),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["studentId"], student.id.to_string());
        assert_eq!(body["scribeId"], scribe.id.to_string());
        assert_eq!(body["studentName"], "Asha Rao");
        assert_eq!(body["examDate"], "2026-10-27T10:00:00Z");
        assert_eq!(body["examDurationMinutes"], 120);
        assert_eq!(body["totalAmount"], "500");
        assert_eq!(body["version"], 1);
    }

    #[tokio::test]
    async fn test_amount_uses_scribe_hourly_rate() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app
            .create_scribe("Meera Iyer", Some(Decimal::new(650, 0)), &[])
            .await
            .unwrap();

        let resp = app
            .send(
                &student,
                Method::POST,
                "/v1/bookings",
                Some(booking_body(scribe.id, "2026-10-27T10:00:00Z")),
            )
            .await;
        let body = parse_body(resp).await;
        assert_eq!(body["totalAmount"], "650");
    }

    #[tokio::test]
    async fn test_create_from_slot_label() {
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
                    "slot": "Tue 14:00",
                    "subject": "Mathematics",
                    "venue": "Room 12",
                })),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        // Six days after Wednesday 2026-10-21
        let body = parse_body(resp).await;
        assert_eq!(body["examDate"], "2026-10-27T14:00:00Z");
    }

    #[tokio::test]
    async fn test_missing_slot_is_400_with_message() {
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
                    "subject": "Mathematics",
                    "venue": "Room 12",
                })),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Please select a time slot");
    }

    #[tokio::test]
    async fn test_empty_subject_is_400() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

        let mut body = booking_body(scribe.id, "2026-10-27T10:00:00Z");
        body["subject"] = json!("");
        let resp = app
            .send(&student, Method::POST, "/v1/bookings", Some(body))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = parse_body(resp).await;
        assert_eq!(body["error"]["message"], "Please enter the exam subject");
    }

    #[tokio::test]
    async fn test_past_exam_date_is_400() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

        let resp = app
            .send(
                &student,
                Method::POST,
                "/v1/bookings",
                Some(booking_body(scribe.id, "2026-10-20T10:00:00Z")),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_scribe_is_400() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");

        let resp = app
            .send(
                &student,
                Method::POST,
                "/v1/bookings",
                Some(booking_body(Uuid::new_v4(), "2026-10-27T10:00:00Z")),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scribe_cannot_create_booking() {
        let app = TestApp::new();
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();
        let other = app.create_scribe("Ravi Kumar", None, &[]).await.unwrap();

        let resp = app
            .send(
                &scribe,
                Method::POST,
                "/v1/bookings",
                Some(booking_body(other.id, "2026-10-27T10:00:00Z")),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_idempotent_replay_returns_200_same_booking() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

        let mut body = booking_body(scribe.id, "2026-10-27T10:00:00Z");
        body["idempotency_key"] = json!("booking-form-7f3a");

        let first = app
            .send(&student, Method::POST, "/v1/bookings", Some(body.clone()))
            .await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let first = parse_body(first).await;

        let second = app
            .send(&student, Method::POST, "/v1/bookings", Some(body))
            .await;
        assert_eq!(second.status(), StatusCode::OK);
        let second = parse_body(second).await;

        assert_eq!(first["id"], second["id"]);
        assert_eq!(app.store.len("bookings"), 1);
    }
}

mod test_read_bookings {
    use super::*;

    async fn create(app: &TestApp, student: &AccountProfile, scribe: Uuid, days: i64) -> String {
        let exam = (test_now() + Duration::days(days)).to_rfc3339();
        let resp = app
            .send(
                student,
                Method::POST,
                "/v1/bookings",
                Some(booking_body(scribe, &exam)),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        parse_body(resp).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_new_booking_listed_for_student_and_scribe() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();
        let id = create(&app, &student, scribe.id, 6).await;

        for account in [&student, &scribe] {
            let resp = app.send(account, Method::GET, "/v1/bookings", None).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body = parse_body(resp).await;
            let list = body.as_array().unwrap();
            assert_eq!(list.len(), 1);
            assert_eq!(list[0]["id"], id.as_str());
            assert_eq!(list[0]["status"], "pending");
        }
    }

    #[tokio::test]
    async fn test_get_booking_only_for_parties() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();
        let stranger = app.create_student("Kiran Das");
        let id = create(&app, &student, scribe.id, 6).await;
        let uri = format!("/v1/bookings/{}", id);

        let resp = app.send(&scribe, Method::GET, &uri, None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app.send(&stranger, Method::GET, &uri, None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .send(
                &student,
                Method::GET,
                &format!("/v1/bookings/{}", Uuid::new_v4()),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    async fn listed_dates(app: &TestApp, account: &AccountProfile, query: &str) -> Vec<String> {
        let resp = app
            .send(account, Method::GET, &format!("/v1/bookings{}", query), None)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        parse_body(resp)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["examDate"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_upcoming_and_recent_views_agree_across_query_plans() {
        let mut results = Vec::new();
        for app in [TestApp::new(), TestApp::without_composite_indexes()] {
            let student = app.create_student("Asha Rao");
            let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();
            for days in [4, 1, 9] {
                create(&app, &student, scribe.id, days).await;
            }
            app.clock.advance(Duration::days(2));

            let upcoming = listed_dates(&app, &scribe, "?view=upcoming").await;
            assert_eq!(
                upcoming,
                vec!["2026-10-25T10:00:00Z", "2026-10-30T10:00:00Z"]
            );

            let recent = listed_dates(&app, &student, "?view=recent&limit=2").await;
            assert_eq!(
                recent,
                vec!["2026-10-30T10:00:00Z", "2026-10-25T10:00:00Z"]
            );

            results.push(listed_dates(&app, &student, "").await);
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0].len(), 3);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();
        let confirmed = create(&app, &student, scribe.id, 3).await;
        create(&app, &student, scribe.id, 5).await;

        let resp = app
            .send(
                &scribe,
                Method::POST,
                &format!("/v1/bookings/{}/confirm", confirmed),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .send(&student, Method::GET, "/v1/bookings?status=confirmed", None)
            .await;
        let body = parse_body(resp).await;
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], confirmed.as_str());
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();
        let rejected = create(&app, &student, scribe.id, 3).await;
        create(&app, &student, scribe.id, 5).await;

        app.send(
            &scribe,
            Method::POST,
            &format!("/v1/bookings/{}/reject", rejected),
            Some(json!({"reason": "Schedule conflict"})),
        )
        .await;

        let resp = app
            .send(&student, Method::GET, "/v1/bookings/summary", None)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["pending"], 1);
        assert_eq!(body["rejected"], 1);
        assert_eq!(body["upcoming"], 1);
    }
}

mod test_update_booking {
    use super::*;

    #[tokio::test]
    async fn test_student_edits_pending_booking_only() {
        let app = TestApp::new();
        let student = app.create_student("Asha Rao");
        let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

        let resp = app
            .send(
                &student,
                Method::POST,
                "/v1/bookings",
                Some(booking_body(scribe.id, "2026-10-27T10:00:00Z")),
            )
            .await;
        let id = parse_body(resp).await["id"].as_str().unwrap().to_string();
        let uri = format!("/v1/bookings/{}", id);

        let resp = app
            .send(
                &student,
                Method::PATCH,
                &uri,
                Some(json!({"venue": "Hall B", "notes": "Ground floor please"})),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["venue"], "Hall B");
        assert_eq!(body["notes"], "Ground floor please");
        assert_eq!(body["version"], 2);

        let resp = app
            .send(&scribe, Method::PATCH, &uri, Some(json!({"venue": "Hall C"})))
            .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        app.send(&scribe, Method::POST, &format!("{}/confirm", uri), None)
            .await;
        let resp = app
            .send(&student, Method::PATCH, &uri, Some(json!({"venue": "Hall C"})))
            .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    }
}
