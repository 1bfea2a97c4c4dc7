use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use triage_api::create_app;
use triage_core::models::DoctorAvailability;
use triage_core::{ApiConfig, QueueConfig, RoutingConfig};
use triage_dispatcher::{DispatchService, QueueService, SameDepartmentStrategy};
use triage_infrastructure::{
    ChannelBroadcaster, InMemoryAppointmentRepository, InMemoryDoctorRepository,
    InMemoryEmergencyRepository, InMemoryQueueRepository, InMemoryRoadConditions,
};

fn doctor(id: i64, department: &str) -> DoctorAvailability {
    DoctorAvailability {
        doctor_id: id,
        name: format!("Dr. {id}"),
        department: department.to_string(),
        is_available: true,
    }
}

/// 创建测试用的应用
fn create_test_app() -> Router {
    let routing = RoutingConfig::default();
    let broadcaster = ChannelBroadcaster::new(64);
    let road_conditions = Arc::new(InMemoryRoadConditions::from_config(&routing.waypoints).unwrap());

    let queue_service = Arc::new(QueueService::new(
        Arc::new(InMemoryQueueRepository::new()),
        Arc::new(InMemoryAppointmentRepository::new()),
        Arc::new(InMemoryDoctorRepository::with_doctors(vec![
            doctor(1, "cardiology"),
            doctor(2, "cardiology"),
        ])),
        Arc::new(broadcaster.clone()),
        Arc::new(SameDepartmentStrategy::new()),
        QueueConfig::default(),
    ));
    let dispatch_service = Arc::new(DispatchService::new(
        Arc::new(InMemoryEmergencyRepository::new()),
        road_conditions,
        Arc::new(broadcaster.clone()),
        &routing,
    ));

    create_app(queue_service, dispatch_service, broadcaster, &ApiConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn booking(patient_id: i64, age: i64, extra: Value) -> Value {
    let mut body = json!({
        "patient_id": patient_id,
        "age": age,
        "gender": "female",
        "doctor_id": 1,
        "appointment_date": "2024-05-01"
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            body.insert(key.clone(), value.clone());
        }
    }
    body
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "triage");
}

#[tokio::test]
async fn test_booking_and_queue_read() {
    let app = create_test_app();

    let (status, json) = send(&app, "POST", "/api/bookings", Some(booking(1, 30, json!({})))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["success"].as_bool().unwrap());
    assert_eq!(json["data"]["priority_category"], "general");
    assert_eq!(json["data"]["queue_position"], 1);

    let (status, json) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(booking(2, 30, json!({"is_maternity": true}))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["priority_score"], 80);
    assert_eq!(json["data"]["queue_position"], 1);

    let (status, json) = send(&app, "GET", "/api/doctors/1/queue?date=2024-05-01", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["patient_id"], 2);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[1]["estimated_wait_minutes"], 10);
}

#[tokio::test]
async fn test_booking_errors() {
    let app = create_test_app();

    let (status, json) = send(&app, "POST", "/api/bookings", Some(booking(1, -4, json!({})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["type"], "INVALID_INPUT");
    assert_eq!(json["error"]["code"], 400);

    let (status, json) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(booking(1, 30, json!({"doctor_id": 77}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["type"], "DOCTOR_NOT_FOUND");
    assert!(json["error"]["suggestions"].is_array());
}

#[tokio::test]
async fn test_queue_lifecycle_endpoints() {
    let app = create_test_app();
    let (_, json) = send(&app, "POST", "/api/bookings", Some(booking(1, 30, json!({})))).await;
    let entry_id = json["data"]["queue_entry_id"].as_i64().unwrap();

    let (status, json) = send(&app, "POST", "/api/doctors/1/call-next?date=2024-05-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], entry_id);
    assert_eq!(json["data"]["status"], "called");

    let (status, _) = send(&app, "POST", &format!("/api/queue/{entry_id}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "POST", &format!("/api/queue/{entry_id}/check-in"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["type"], "INVALID_TRANSITION");

    let (status, _) = send(&app, "POST", "/api/queue/999/call", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, "POST", "/api/doctors/1/call-next?date=2024-05-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_availability_toggle_reassigns() {
    let app = create_test_app();
    send(&app, "POST", "/api/bookings", Some(booking(1, 30, json!({})))).await;
    send(&app, "POST", "/api/bookings", Some(booking(2, 65, json!({})))).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/doctors/1/availability",
        Some(json!({"is_available": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["reassigned_to"], 2);
    assert_eq!(json["data"]["moved_entries"], 2);

    let (_, json) = send(&app, "GET", "/api/doctors/2/queue?date=2024-05-01", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_route_calculation() {
    let app = create_test_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/routes/calculate",
        Some(json!({
            "driver_location": {"lat": 12.9716, "lng": 77.5946},
            "pickup_location": {"lat": 12.98, "lng": 77.6},
            "hospital_location": {"lat": 12.9716, "lng": 77.5946}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let total = json["data"]["total_distance_km"].as_f64().unwrap();
    assert!(total >= 0.0);
    assert_eq!(
        json["data"]["estimated_time_minutes"].as_i64().unwrap(),
        (total / 40.0 * 60.0).ceil() as i64
    );
    assert!(json["message"].is_null());
}

#[tokio::test]
async fn test_unreachable_route_is_ok_with_message() {
    let app = create_test_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/routes/calculate",
        Some(json!({
            "driver_location": {"lat": 12.9716, "lng": 77.5946},
            "pickup_location": {"lat": 15.0, "lng": 75.0},
            "hospital_location": {"lat": 12.9716, "lng": 77.5946},
            "waypoints": []
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_distance_km"], -1.0);
    assert_eq!(json["data"]["estimated_time_minutes"], -1);
    assert_eq!(json["message"], "route unavailable, dispatch via default path");
}

#[tokio::test]
async fn test_emergency_accept_flow() {
    let app = create_test_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/emergencies",
        Some(json!({"patient_id": 5, "pickup_location": {"lat": 12.98, "lng": 77.6}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["status"], "pending");
    let id = json["data"]["id"].as_i64().unwrap();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/emergencies/{id}/accept"),
        Some(json!({"driver_id": 3, "driver_location": {"lat": 12.9716, "lng": 77.5946}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["emergency_id"], id);
    assert_eq!(json["data"]["route_available"], true);
    assert_eq!(json["data"]["to_patient"]["reachable"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/api/emergencies/999/accept",
        Some(json!({"driver_id": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traffic_update() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/traffic",
        Some(json!({"waypoint_id": "mg_road", "safety_factor": 2.0})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(json["success"].as_bool().unwrap());

    let (_, json) = send(&app, "GET", "/api/routes/waypoints", None).await;
    let mg_road = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|w| w["id"] == "mg_road")
        .cloned()
        .unwrap();
    assert_eq!(mg_road["safety_factor"], 2.0);

    let (status, json) = send(
        &app,
        "POST",
        "/api/traffic",
        Some(json!({"waypoint_id": "nowhere", "safety_factor": 2.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["type"], "UNKNOWN_WAYPOINT");

    let (status, _) = send(
        &app,
        "POST",
        "/api/traffic",
        Some(json!({"waypoint_id": "mg_road", "safety_factor": 0.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_stream_delivers_queue_changed() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    send(&app, "POST", "/api/bookings", Some(booking(1, 30, json!({})))).await;

    let mut body = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(text.contains("event: QUEUE_CHANGED"));
    assert!(text.contains("\"doctor_id\":1"));
}
