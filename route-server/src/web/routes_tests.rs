//! HTTP tests against a server bound to a random local port.

use axum::routing::get;
use axum::{Json, Router};
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::directions::{DirectionsClient, DirectionsConfig};
use crate::domain::{Coordinate, Stop, offset_north};
use crate::eta::EtaConfig;
use crate::proximity::GeofenceConfig;
use crate::sequencer::{Planner, SequencerConfig};
use crate::tracking::{RegistryConfig, SessionRegistry};

use super::{AppState, create_router};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_app(provider: Option<DirectionsClient>) -> String {
    let planner = Planner::new(provider, SequencerConfig::default(), EtaConfig::default());
    let sessions = SessionRegistry::new(GeofenceConfig::default(), &RegistryConfig::default());
    serve(create_router(AppState::new(planner, sessions))).await
}

fn abc() -> Value {
    json!({
        "stops": [
            {"id": "A", "lat": 0.0, "lng": 0.0},
            {"id": "B", "lat": 1.0, "lng": 0.0},
            {"id": "C", "lat": 0.0, "lng": 1.0}
        ],
        "origin": {"lat": 0.0, "lng": 0.0}
    })
}

fn ids(body: &Value) -> Vec<&str> {
    body["optimizedStops"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn health_check() {
    let base = spawn_app(None).await;
    let body = reqwest::get(format!("{base}/health")).await.unwrap().text().await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn optimize_without_provider_uses_fallback() {
    let base = spawn_app(None).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/optimize"))
        .json(&abc())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(ids(&body), vec!["A", "B", "C"]);
    assert_eq!(body["sourceEngine"], "fallback");
    assert_eq!(body["message"], "Route optimized internally");

    let first = &body["optimizedStops"][0];
    assert_eq!(first["order"], 1);
    assert_eq!(first["estimatedArrival"].as_str().unwrap().len(), 5);
    assert_eq!(first["estimatedDeparture"].as_str().unwrap().len(), 5);
}

#[tokio::test]
async fn optimize_with_provider_reports_remote() {
    let directions = Router::new().route(
        "/directions/json",
        get(|| async {
            Json(json!({
                "status": "OK",
                "routes": [{
                    "waypoint_order": [1, 0],
                    "legs": [{"duration": {"value": 300}, "distance": {"value": 2000}}]
                }]
            }))
        }),
    );
    let directions_url = serve(directions).await;
    let client =
        DirectionsClient::new(DirectionsConfig::new("test-key").with_base_url(directions_url))
            .unwrap();
    let base = spawn_app(Some(client)).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/optimize"))
        .json(&abc())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["sourceEngine"], "remote");
    assert_eq!(body["message"], "Route optimized with real-time traffic");
    assert_eq!(ids(&body), vec!["C", "A", "B"]);
}

#[tokio::test]
async fn too_few_stops_is_bad_request() {
    let base = spawn_app(None).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/optimize"))
        .json(&json!({
            "stops": [{"id": "A", "lat": 0.0, "lng": 0.0}],
            "origin": {"lat": 0.0, "lng": 0.0}
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Not enough stops to optimize");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let base = spawn_app(None).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/optimize"))
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON: "));
}

#[tokio::test]
async fn tracking_session_flow() {
    let base = spawn_app(None).await;
    let http = reqwest::Client::new();

    let response = http.post(format!("{base}/tracking/sessions")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    let id = created["sessionId"].as_u64().unwrap();
    let session = format!("{base}/tracking/sessions/{id}");

    let mut stop = Stop::new("drop-1", 51.5074, -0.1278).with_address("Trafalgar Square");
    stop.order = 1;
    let response = http
        .put(format!("{session}/stops"))
        .json(&json!({"stops": [stop.clone()]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let near = offset_north(stop.position(), 40.0);
    let far = offset_north(stop.position(), 500.0);
    let report = |position: Coordinate, timestamp: &'static str| {
        http.post(format!("{session}/positions"))
            .json(&json!({"lat": position.lat, "lng": position.lng, "timestamp": timestamp}))
            .send()
    };

    let body: Value = report(far, "2024-05-01T09:00:00Z").await.unwrap().json().await.unwrap();
    assert_eq!(body, json!({"event": null}));

    let body: Value = report(near, "2024-05-01T09:01:00Z").await.unwrap().json().await.unwrap();
    assert_eq!(body["event"]["stopId"], "drop-1");
    assert_eq!(body["event"]["stopOrder"], 1);
    assert_eq!(body["event"]["address"], "Trafalgar Square");

    // Still inside the geofence: no repeat
    let body: Value = report(near, "2024-05-01T09:02:00Z").await.unwrap().json().await.unwrap();
    assert_eq!(body["event"], Value::Null);

    let response = http
        .put(format!("{session}/active"))
        .json(&json!({"active": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = http.delete(session.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = report(near, "2024-05-01T09:03:00Z").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unreadable_position_is_dropped() {
    let base = spawn_app(None).await;
    let http = reqwest::Client::new();

    let created: Value = http
        .post(format!("{base}/tracking/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["sessionId"].as_u64().unwrap();

    for body in [r#"{"lat": "north", "lng": 0.0}"#, r#"{"lat": 1.0}"#, "garbage"] {
        let response = http
            .post(format!("{base}/tracking/sessions/{id}/positions"))
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = response.json().await.unwrap();
        assert_eq!(value, json!({"event": null}));
    }

    let response = http
        .post(format!("{base}/tracking/sessions/999/positions"))
        .body("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_session_ids() {
    let base = spawn_app(None).await;
    let http = reqwest::Client::new();

    let response = http
        .delete(format!("{base}/tracking/sessions/not-a-number"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = http
        .put(format!("{base}/tracking/sessions/999/active"))
        .json(&json!({"active": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unknown tracking session: 999");
}
