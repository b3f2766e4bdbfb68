//! REST boundary over the in-process store: envelopes, status codes, relationship paths.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sportshub::{api_router, AppState, MemoryStore};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    api_router(AppState::new(Arc::new(MemoryStore::default())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create(app: &Router, path: &str, body: Value) -> Value {
    let (status, v) = send(app, "POST", path, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{v}");
    v["data"].clone()
}

#[tokio::test]
async fn service_routes() {
    let app = app();
    let (status, v) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({"ok": true, "service": "sportshub"}));

    let (status, v) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");

    let (status, v) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["database"], "ok");

    let (_, v) = send(&app, "GET", "/version", None).await;
    assert_eq!(v["name"], "sportshub");
}

#[tokio::test]
async fn city_lifecycle() {
    let app = app();
    let paris = create(&app, "/cities", json!({"name": "Paris", "countryCode": "FR", "slug": "paris"})).await;
    let id = paris["id"].as_i64().unwrap();
    assert_eq!(paris["tz"], Value::Null);

    let (status, v) = send(&app, "GET", &format!("/cities/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"], paris);

    let (status, v) = send(&app, "PATCH", &format!("/cities/{id}"), Some(json!({"tz": "Europe/Paris"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["tz"], "Europe/Paris");
    assert_eq!(v["data"]["name"], "Paris");

    let (status, v) = send(&app, "GET", "/cities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["meta"]["count"], 1);

    let (status, v) = send(&app, "DELETE", &format!("/cities/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({"ok": true}));

    let (status, v) = send(&app, "GET", &format!("/cities/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"]["code"], "not_found");
}

#[tokio::test]
async fn constraint_violations_are_400() {
    let app = app();
    let body = json!({"name": "Paris", "countryCode": "FR", "slug": "paris"});
    create(&app, "/cities", body.clone()).await;
    let (status, v) = send(&app, "POST", "/cities", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"]["code"], "constraint_violation");
    assert!(v["error"]["message"].as_str().unwrap().contains("cities_slug_key"));

    let (status, _) = send(&app, "POST", "/venues", Some(json!({"name": "X", "slug": "x", "city_id": 77}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payload_shape_errors_never_reach_the_engine() {
    let app = app();
    let (status, _) = send(&app, "POST", "/cities", Some(json!({"name": "Paris"}))).await;
    assert!(status.is_client_error());

    let (status, _) = send(&app, "POST", "/stages", Some(json!({"name": "G", "type": "LEAGUE", "season_id": 1}))).await;
    assert!(status.is_client_error());

    let (status, _) = send(&app, "GET", "/cities/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_email_is_422() {
    let app = app();
    let (status, v) = send(
        &app,
        "POST",
        "/email_subscribers",
        Some(json!({"email": "not-an-address", "createdAt": "2026-05-01T09:00:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["error"]["code"], "validation_error");

    let sub = create(
        &app,
        "/email_subscribers",
        json!({"email": "fan@example.com", "createdAt": "2026-05-01T09:00:00"}),
    )
    .await;
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/email_subscribers/{}", sub["id"]),
        Some(json!({"email": "broken@"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn email_domain_case_does_not_make_a_new_subscriber() {
    let app = app();
    let sub = create(
        &app,
        "/email_subscribers",
        json!({"email": "fan@Example.COM", "createdAt": "2026-05-01T09:00:00"}),
    )
    .await;
    assert_eq!(sub["email"], "fan@example.com");

    let (status, v) = send(
        &app,
        "POST",
        "/email_subscribers",
        Some(json!({"email": "fan@EXAMPLE.com", "createdAt": "2026-05-02T09:00:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"]["code"], "constraint_violation");

    let (_, v) = send(&app, "GET", "/email_subscribers", None).await;
    assert_eq!(v["meta"]["count"], 1);
}

#[tokio::test]
async fn list_honours_skip_and_limit() {
    let app = app();
    for i in 0..5 {
        create(&app, "/teams", json!({"name": format!("T{i}"), "slug": format!("t{i}")})).await;
    }
    let (_, v) = send(&app, "GET", "/teams?skip=1&limit=2", None).await;
    let slugs: Vec<&str> = v["data"].as_array().unwrap().iter().map(|t| t["slug"].as_str().unwrap()).collect();
    assert_eq!(slugs, vec!["t1", "t2"]);
    assert_eq!(v["meta"]["count"], 2);

    let (status, v) = send(&app, "GET", "/teams?skip=3&limit=18446744073709551615", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["meta"]["count"], 2);
}

#[tokio::test]
async fn relationship_paths() {
    let app = app();
    let paris = create(&app, "/cities", json!({"name": "Paris", "countryCode": "FR", "slug": "paris"})).await;
    let venue = create(&app, "/venues", json!({"name": "Parc", "slug": "parc", "city_id": paris["id"]})).await;
    let comp = create(
        &app,
        "/competitions",
        json!({"name": "World Cup", "code": "WC", "kind": "national", "slug": "wc"}),
    )
    .await;
    let season = create(
        &app,
        "/seasons",
        json!({"yearStart": 2026, "yearEnd": 2026, "slug": "wc-2026", "competition_id": comp["id"]}),
    )
    .await;
    let fra = create(&app, "/teams", json!({"name": "France", "slug": "fra"})).await;
    let bra = create(&app, "/teams", json!({"name": "Brazil", "slug": "bra"})).await;
    let fixture = create(
        &app,
        "/matches",
        json!({
            "kickoff": "2026-06-11T18:00:00", "status": "SCHEDULED", "season_id": season["id"],
            "venue_id": venue["id"], "home_team_id": fra["id"], "away_team_id": bra["id"]
        }),
    )
    .await;

    let (_, v) = send(&app, "GET", &format!("/cities/{}/venues", paris["id"]), None).await;
    assert_eq!(v["data"], json!([venue]));

    let (_, v) = send(&app, "GET", &format!("/competitions/{}/seasons", comp["id"]), None).await;
    assert_eq!(v["meta"]["count"], 1);

    let (_, v) = send(&app, "GET", &format!("/seasons/{}/matches", season["id"]), None).await;
    assert_eq!(v["data"], json!([fixture.clone()]));

    let (_, v) = send(&app, "GET", &format!("/venues/{}/matches", venue["id"]), None).await;
    assert_eq!(v["meta"]["count"], 1);

    let (_, v) = send(&app, "GET", &format!("/teams/{}/matches", bra["id"]), None).await;
    assert_eq!(v["meta"]["count"], 1);
    let (_, v) = send(&app, "GET", &format!("/teams/{}/matches?role=home", bra["id"]), None).await;
    assert_eq!(v["meta"]["count"], 0);
    let (_, v) = send(&app, "GET", &format!("/teams/{}/matches?role=away", bra["id"]), None).await;
    assert_eq!(v["data"], json!([fixture]));

    let (status, v) = send(&app, "GET", "/pages/999/blocks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["meta"]["count"], 0);
}

#[tokio::test]
async fn deleting_a_city_with_venues_is_rejected() {
    let app = app();
    let paris = create(&app, "/cities", json!({"name": "Paris", "countryCode": "FR", "slug": "paris"})).await;
    let venue = create(&app, "/venues", json!({"name": "Parc", "slug": "parc", "city_id": paris["id"]})).await;

    let (status, _) = send(&app, "DELETE", &format!("/cities/{}", paris["id"]), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/venues/{}", venue["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/cities/{}", paris["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
}
