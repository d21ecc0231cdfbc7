// crates/backend-lib/tests/api.rs
//! HTTP surface tests: routing, auth gating, and audit side effects.
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use clawcontrol_backend_lib::{config::Settings, router::create_router, store::Db, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    app_with_settings(Settings::default())
}

fn app_with_settings(settings: Settings) -> Router {
    create_router(Arc::new(AppState::new(Db::in_memory(), settings)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str, name: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": email, "name": name, "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_healthz() {
    let app = app();
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_then_me() {
    let app = app();
    let reg = register(&app, "a@x.com", "Ada").await;
    let token = reg["token"].as_str().unwrap();

    let (status, profile) = send(&app, Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "a@x.com");
    assert_eq!(profile["current_org_id"], reg["org_id"]);
    assert_eq!(profile["orgs"][0]["role"], "owner");

    // No token yields null, not 401.
    let (status, profile) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(profile.is_null());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = app();
    register(&app, "a@x.com", "Ada").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "A@X.com", "name": "Else", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "USER_001");
}

#[tokio::test]
async fn test_login_failures_share_one_body() {
    let app = app();
    register(&app, "a@x.com", "Ada").await;

    let (status_pw, body_pw) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "wrongpass"})),
    )
    .await;
    let (status_user, body_user) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "nobody@x.com", "password": "secret123"})),
    )
    .await;

    assert_eq!(status_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(status_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body_pw, body_user);
}

#[tokio::test]
async fn test_instance_crud_audit_and_overview() {
    let app = app();
    let reg = register(&app, "a@x.com", "Ada").await;
    let token = reg["token"].as_str().unwrap();
    let org_id = reg["org_id"].as_str().unwrap();

    let (status, instance) = send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/instances"),
        Some(token),
        Some(json!({"name": "gw-1", "gateway_url": "https://gw.example", "version": "1.2.0"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(instance["status"], "provisioning");
    let instance_id = instance["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/instances/{instance_id}"),
        Some(token),
        Some(json!({"status": "online"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "online");
    assert!(!updated["last_seen_at"].is_null());

    let (status, list) = send(
        &app,
        Method::GET,
        &format!("/api/orgs/{org_id}/instances"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, overview) = send(
        &app,
        Method::GET,
        &format!("/api/orgs/{org_id}/overview"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["instance_total"], 1);
    assert_eq!(overview["instances_online"], 1);
    assert_eq!(overview["agent_total"], 0);

    // Both mutations landed in the audit trail, newest first.
    let (status, audit) = send(
        &app,
        Method::GET,
        &format!("/api/orgs/{org_id}/audit"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = audit
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["instance.update", "instance.create"]);
}

#[tokio::test]
async fn test_posting_a_message_is_audited() {
    let app = app();
    let reg = register(&app, "a@x.com", "Ada").await;
    let token = reg["token"].as_str().unwrap();
    let org_id = reg["org_id"].as_str().unwrap();

    let (_, instance) = send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/instances"),
        Some(token),
        Some(json!({"name": "gw-1", "gateway_url": "https://gw.example", "version": "1.2.0"})),
    )
    .await;
    let (_, agent) = send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/agents"),
        Some(token),
        Some(json!({"instance_id": instance["id"], "name": "helper", "model": "claw-1"})),
    )
    .await;
    let (_, session) = send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/sessions"),
        Some(token),
        Some(json!({"agent_id": agent["id"], "title": "triage"})),
    )
    .await;
    let session_id = session["id"].as_str().unwrap();

    let (status, message) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{session_id}/messages"),
        Some(token),
        Some(json!({"sender": "user", "content": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, audit) = send(
        &app,
        Method::GET,
        &format!("/api/orgs/{org_id}/audit"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let newest = &audit[0];
    assert_eq!(newest["action"], "message.create");
    assert_eq!(newest["entity"], "message");
    assert_eq!(newest["entity_id"], message["id"]);
    assert_eq!(newest["actor_id"], reg["user_id"]);
}

#[tokio::test]
async fn test_viewer_cannot_write() {
    let app = app();
    let owner = register(&app, "owner@x.com", "Owner").await;
    let viewer = register(&app, "viewer@x.com", "Viewer").await;
    let owner_token = owner["token"].as_str().unwrap();
    let viewer_token = viewer["token"].as_str().unwrap();
    let org_id = owner["org_id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/members"),
        Some(owner_token),
        Some(json!({"email": "viewer@x.com", "role": "viewer"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Reads are fine for a viewer.
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/orgs/{org_id}/instances"),
        Some(viewer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Writes are not.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/instances"),
        Some(viewer_token),
        Some(json!({"name": "gw", "gateway_url": "https://x", "version": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "AUTH_003");
}

#[tokio::test]
async fn test_outsider_cannot_read_another_org() {
    let app = app();
    let a = register(&app, "a@x.com", "Ada").await;
    let b = register(&app, "b@x.com", "Bob").await;

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/orgs/{}/instances", a["org_id"].as_str().unwrap()),
        Some(b["token"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_last_owner_cannot_be_demoted() {
    let app = app();
    let reg = register(&app, "a@x.com", "Ada").await;
    let token = reg["token"].as_str().unwrap();
    let org_id = reg["org_id"].as_str().unwrap();

    let (status, members) = send(
        &app,
        Method::GET,
        &format!("/api/orgs/{org_id}/members"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let member_id = members[0]["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/members/{member_id}"),
        Some(token),
        Some(json!({"role": "member"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let mut settings = Settings::default();
    settings.rate_limit.max_requests = 3;
    let app = app_with_settings(settings);

    for _ in 0..3 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_001");
}
