use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use collector_routing::config::environment::EnvironmentConfig;
use collector_routing::models::CreateRouteResponse;
use collector_routing::routes::create_app;
use collector_routing::services::test_support::{client, route, FakeGateway, GatewayCall};
use collector_routing::state::AppState;

fn create_test_app(gateway: Arc<FakeGateway>) -> Router {
    create_app(AppState::new(EnvironmentConfig::default(), gateway))
}

fn empty_gateway() -> Arc<FakeGateway> {
    Arc::new(FakeGateway::new(Vec::new(), Vec::new()))
}

fn assign(client_id: &str, collector_id: &str, route_id: &str) -> GatewayCall {
    GatewayCall::Assign {
        client_id: client_id.to_string(),
        collector_id: collector_id.to_string(),
        route_id: route_id.to_string(),
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
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
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn open_board(app: &Router, collector: &str) -> String {
    let (status, body) = send(app, Method::POST, "/api/board", None).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["sessionId"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        Method::PUT,
        &format!("/api/board/{}/collector", id),
        Some(json!({ "collectorId": collector })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(empty_gateway());
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_open_board_lists_collectors() {
    let app = create_test_app(empty_gateway());
    let (status, body) = send(&app, Method::POST, "/api/board", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["collectors"][0]["name"], "Ximena");

    let id = body["data"]["sessionId"].as_str().unwrap();
    let (status, body) = send(&app, Method::GET, &format!("/api/board/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "idle");
    assert_eq!(body["data"]["phase"]["state"], "idle");
}

#[tokio::test]
async fn test_unknown_board_is_not_found() {
    let app = create_test_app(empty_gateway());
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/board/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_blank_collector_is_rejected() {
    let app = create_test_app(empty_gateway());
    let (_, body) = send(&app, Method::POST, "/api/board", None).await;
    let id = body["data"]["sessionId"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/board/{}/collector", id),
        Some(json!({ "collectorId": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_drag_pool_to_route_over_http() {
    let gateway = Arc::new(FakeGateway::new(
        vec![route("R1", "X", Vec::new())],
        vec![client("C5", "Carmen Lopez")],
    ));
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/start", id),
        Some(json!({ "clientId": "C5", "origin": { "kind": "pool" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["client"]["id"], "C5");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/end", id),
        Some(json!({ "destination": { "kind": "route", "routeId": "R1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"]["result"], "applied");
    assert_eq!(body["data"]["board"]["routes"][0]["clients"][0]["id"], "C5");
    assert_eq!(body["data"]["board"]["unassigned"], json!([]));
    assert_eq!(gateway.mutations(), vec![assign("C5", "X", "R1")]);
}

#[tokio::test]
async fn test_drop_on_placeholder_creates_route_first() {
    let gateway = Arc::new(FakeGateway::new(Vec::new(), vec![client("C42", "Carlos")]));
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;

    send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/start", id),
        Some(json!({ "clientId": "C42", "origin": { "kind": "pool" } })),
    )
    .await;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/end", id),
        Some(json!({ "destination": { "kind": "placeholder" } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"]["result"], "applied");
    assert_eq!(
        gateway.mutations(),
        vec![GatewayCall::CreateRoute("X".to_string()), assign("C42", "X", "NEW1")]
    );
}

#[tokio::test]
async fn test_route_creation_without_id_aborts_move() {
    let gateway = Arc::new(FakeGateway::new(Vec::new(), vec![client("C42", "Carlos")]));
    gateway.set_create_route_response(CreateRouteResponse {
        success: true,
        message: None,
        route_id: None,
    });
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;

    send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/start", id),
        Some(json!({ "clientId": "C42", "origin": { "kind": "pool" } })),
    )
    .await;
    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/end", id),
        Some(json!({ "destination": { "kind": "placeholder" } })),
    )
    .await;

    assert_eq!(body["data"]["outcome"]["result"], "failed");
    assert_eq!(body["data"]["board"]["lastOutcome"]["result"], "failed");
    assert_eq!(gateway.mutations(), vec![GatewayCall::CreateRoute("X".to_string())]);
    assert_eq!(body["data"]["board"]["unassigned"][0]["id"], "C42");
}

#[tokio::test]
async fn test_drag_route_to_pool_and_cancelled_drag() {
    let gateway = Arc::new(FakeGateway::new(
        vec![route("R7", "X", vec![client("C10", "Celia")])],
        Vec::new(),
    ));
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;
    let start = json!({ "clientId": "C10", "origin": { "kind": "route", "routeId": "R7" } });

    send(&app, Method::POST, &format!("/api/board/{}/drag/start", id), Some(start.clone())).await;
    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/end", id),
        Some(json!({})),
    )
    .await;
    assert_eq!(body["data"]["outcome"]["result"], "cancelled");
    assert!(gateway.mutations().is_empty());

    send(&app, Method::POST, &format!("/api/board/{}/drag/start", id), Some(start)).await;
    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/end", id),
        Some(json!({ "destination": { "kind": "pool" } })),
    )
    .await;
    assert_eq!(body["data"]["outcome"]["result"], "applied");
    assert_eq!(body["data"]["board"]["routes"][0]["clients"], json!([]));
    assert_eq!(gateway.mutations(), vec![GatewayCall::Unassign("C10".to_string())]);
}

#[tokio::test]
async fn test_drag_start_with_unknown_client_is_bad_request() {
    let gateway = Arc::new(FakeGateway::new(Vec::new(), vec![client("C1", "Ana")]));
    let app = create_test_app(gateway);
    let id = open_board(&app, "X").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/start", id),
        Some(json!({ "clientId": "C999", "origin": { "kind": "pool" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_filter_and_unique_clients() {
    let gateway = Arc::new(FakeGateway::new(
        vec![
            route("R1", "X", vec![client("A", "Ana Lopez"), client("B", "Beto")]),
            route("R2", "X", vec![client("B", "Beto"), client("C", "Carla")]),
        ],
        vec![client("C1", "Maria Lopez"), client("C2", "Juan Perez")],
    ));
    let app = create_test_app(gateway);
    let id = open_board(&app, "X").await;

    let (_, body) = send(&app, Method::GET, &format!("/api/board/{}/clients", id), None).await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/board/{}/search", id),
        Some(json!({ "text": "lopez" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unassigned"], json!([client("C1", "Maria Lopez")]));
    assert_eq!(body["data"]["routes"][0]["clients"][0]["name"], "Ana Lopez");
    assert_eq!(body["data"]["routes"][1]["clients"], json!([]));

    let (_, body) = send(&app, Method::GET, &format!("/api/board/{}/clients", id), None).await;
    assert_eq!(body["data"], json!([client("A", "Ana Lopez")]));

    let (_, body) = send(
        &app,
        Method::PUT,
        &format!("/api/board/{}/search", id),
        Some(json!({ "text": "" })),
    )
    .await;
    assert_eq!(body["data"]["unassigned"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_explicit_route_creation() {
    let gateway = Arc::new(FakeGateway::new(Vec::new(), Vec::new()));
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;

    let (status, body) = send(&app, Method::POST, &format!("/api/board/{}/routes", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["routeId"], "NEW1");
    assert_eq!(body["data"]["board"]["routes"][0]["id"], "NEW1");
}

#[tokio::test]
async fn test_rejected_route_creation_is_a_conflict() {
    let gateway = empty_gateway();
    gateway.set_create_route_response(CreateRouteResponse {
        success: false,
        message: Some("El cobrador ya tiene el máximo de rutas".to_string()),
        route_id: None,
    });
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;

    let (status, body) = send(&app, Method::POST, &format!("/api/board/{}/routes", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "El cobrador ya tiene el máximo de rutas");
}

#[tokio::test]
async fn test_route_creation_transport_error_is_bad_gateway() {
    let gateway = empty_gateway();
    gateway.fail_create.store(true, Ordering::SeqCst);
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;

    let (status, _) = send(&app, Method::POST, &format!("/api/board/{}/routes", id), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(gateway.mutations(), vec![GatewayCall::CreateRoute("X".to_string())]);
}

#[tokio::test]
async fn test_drop_on_placeholder_with_unreachable_gateway_fails_move() {
    let gateway = Arc::new(FakeGateway::new(Vec::new(), vec![client("C42", "Carlos")]));
    gateway.fail_create.store(true, Ordering::SeqCst);
    let app = create_test_app(gateway.clone());
    let id = open_board(&app, "X").await;

    send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/start", id),
        Some(json!({ "clientId": "C42", "origin": { "kind": "pool" } })),
    )
    .await;
    gateway.clear_calls();
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/board/{}/drag/end", id),
        Some(json!({ "destination": { "kind": "placeholder" } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"]["result"], "failed");
    assert_eq!(gateway.mutations(), vec![GatewayCall::CreateRoute("X".to_string())]);
    assert!(gateway.calls().contains(&GatewayCall::ListUnassigned));
    assert_eq!(body["data"]["board"]["unassigned"][0]["id"], "C42");
}

#[tokio::test]
async fn test_close_board() {
    let app = create_test_app(empty_gateway());
    let id = open_board(&app, "X").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/board/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/board/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
