//! Scribe discovery and slot listing

use axum::http::{Method, StatusCode};
use eklavya_scribes::ScribeProfile;
use uuid::Uuid;

use crate::common::{parse_body, TestApp};

async fn seed(app: &TestApp) {
    let mut meera = ScribeProfile::new(Uuid::new_v4(), "Meera Iyer");
    meera.rating = 4.2;
    meera.languages.insert("Tamil".to_string());
    meera.subjects.insert("Physics".to_string());

    let mut ravi = ScribeProfile::new(Uuid::new_v4(), "Ravi Kumar");
    ravi.rating = 4.9;
    ravi.languages.insert("Hindi".to_string());
    ravi.subjects.insert("Economics".to_string());

    let mut anita = ScribeProfile::new(Uuid::new_v4(), "Anita Shah");
    anita.rating = 5.0;
    anita.is_available = false;
    anita.languages.insert("Hindi".to_string());

    for profile in [&meera, &ravi, &anita] {
        app.upsert_profile(profile).await.unwrap();
    }
}

async fn names(app: &TestApp, uri: &str) -> Vec<String> {
    let student = app.create_student("Asha Rao");
    let resp = app.send(&student, Method::GET, uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    let mut names: Vec<String> = parse_body(resp)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    if !uri.contains("nearby") {
        names.sort();
    }
    names
}

#[tokio::test]
async fn test_search_by_language_and_text() {
    let app = TestApp::new();
    seed(&app).await;

    assert_eq!(names(&app, "/v1/scribes").await.len(), 3);
    assert_eq!(
        names(&app, "/v1/scribes?language=Hindi").await,
        vec!["Anita Shah", "Ravi Kumar"]
    );
    assert_eq!(
        names(&app, "/v1/scribes?language=Hindi&available_only=true").await,
        vec!["Ravi Kumar"]
    );
    assert_eq!(names(&app, "/v1/scribes?q=phys").await, vec!["Meera Iyer"]);
    assert_eq!(names(&app, "/v1/scribes?subject=Any").await.len(), 3);
}

#[tokio::test]
async fn test_nearby_is_available_by_rating_on_both_plans() {
    for app in [TestApp::new(), TestApp::without_composite_indexes()] {
        seed(&app).await;
        assert_eq!(
            names(&app, "/v1/scribes/nearby").await,
            vec!["Ravi Kumar", "Meera Iyer"]
        );
    }
}

#[tokio::test]
async fn test_nearby_zero_radius_is_400() {
    let app = TestApp::new();
    let student = app.create_student("Asha Rao");
    let resp = app
        .send(&student, Method::GET, "/v1/scribes/nearby?max_distance_km=0", None)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_scribe() {
    let app = TestApp::new();
    let student = app.create_student("Asha Rao");
    let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

    let resp = app
        .send(&student, Method::GET, &format!("/v1/scribes/{}", scribe.id), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = parse_body(resp).await;
    assert_eq!(body["name"], "Meera Iyer");
    assert_eq!(body["isAvailable"], true);

    let resp = app
        .send(&student, Method::GET, &format!("/v1/scribes/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_default_week_slots_soonest_first() {
    let app = TestApp::new();
    let student = app.create_student("Asha Rao");
    let scribe = app.create_scribe("Meera Iyer", None, &[]).await.unwrap();

    let resp = app
        .send(
            &student,
            Method::GET,
            &format!("/v1/scribes/{}/slots", scribe.id),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = parse_body(resp).await;
    let slots = body.as_array().unwrap();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0]["label"], "Thu 11:00");
    assert_eq!(slots[0]["nextOccurrence"], "2026-10-22T11:00:00Z");
}

#[tokio::test]
async fn test_custom_slots_and_unoffered_slot_rejected() {
    let app = TestApp::new();
    let student = app.create_student("Asha Rao");
    let scribe = app
        .create_scribe("Meera Iyer", None, &["Sun 18:30"])
        .await
        .unwrap();

    let resp = app
        .send(
            &student,
            Method::GET,
            &format!("/v1/scribes/{}/slots", scribe.id),
            None,
        )
        .await;
    let body = parse_body(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["nextOccurrence"], "2026-10-25T18:30:00Z");

    let resp = app
        .send(
            &student,
            Method::POST,
            "/v1/bookings",
            Some(serde_json::json!({
                "scribe_id": scribe.id,
                "slot": "Tue 14:00",
                "subject": "Physics",
                "venue": "Hall A",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
