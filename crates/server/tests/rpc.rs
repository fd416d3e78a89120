use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use configs::DirectoryConfig;
use serde_json::{json, Value};
use service::storage::{MemoryStore, RecordStore, StoreError};
use tower::ServiceExt;

fn app_with(store: &MemoryStore, cfg: DirectoryConfig) -> Router {
    server::startup::app(Arc::new(store.clone()), &cfg)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.expect("router is infallible");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.expect("read body");
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json body") };
    (status, body)
}

async fn call(app: &Router, method: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(format!("/directory.Directory/{method}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, req).await
}

fn player(id: &str, name: &str) -> Value {
    json!({"id": {"id": id}, "name": name})
}

fn assert_rpc_error(res: &(StatusCode, Value), status: StatusCode, code: &str) {
    assert_eq!(res.0, status, "body: {}", res.1);
    assert_eq!(res.1["code"], code, "body: {}", res.1);
}

#[tokio::test]
async fn health_is_ok() {
    let app = app_with(&MemoryStore::new(), DirectoryConfig::default());
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn create_get_update_delete_scenario() {
    let app = app_with(&MemoryStore::new(), DirectoryConfig::default());

    let (status, created) = call(&app, "CreatePlayer", player("p1", "Aria")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], json!({"id": "p1"}));
    assert_eq!(created["name"], "Aria");

    let (status, fetched) = call(&app, "GetPlayer", json!({"id": "p1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = call(&app, "UpdatePlayer", player("p1", "Aria2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], json!({"id": "p1"}));
    assert_eq!(updated["name"], "Aria2");

    let (status, deleted) = call(&app, "DeletePlayer", json!({"id": "p1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"id": "p1"}));

    let res = call(&app, "GetPlayer", json!({"id": "p1"})).await;
    assert_rpc_error(&res, StatusCode::NOT_FOUND, "not_found");
}

#[tokio::test]
async fn empty_or_null_ids_are_invalid_without_store_access() {
    let store = MemoryStore::new();
    let app = app_with(&store, DirectoryConfig::default());

    for method in ["GetPlayer", "DeletePlayer"] {
        for body in [json!({"id": ""}), json!({}), Value::Null] {
            let res = call(&app, method, body).await;
            assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
        }
    }
    let res = call(&app, "UpdatePlayer", json!({"name": "Aria"})).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
    assert_eq!(res.1["message"], "ID is empty, please try again");

    assert_eq!(store.op_count(), 0);
}

#[tokio::test]
async fn create_with_empty_name_is_invalid_without_store_access() {
    let store = MemoryStore::new();
    let app = app_with(&store, DirectoryConfig::default());

    let res = call(&app, "CreatePlayer", player("p1", "")).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
    assert_eq!(res.1["message"], "Name is empty, please try again");
    assert_eq!(store.op_count(), 0);
}

#[tokio::test]
async fn duplicate_create_is_invalid_and_keeps_first_record() {
    let store = MemoryStore::new();
    let app = app_with(&store, DirectoryConfig::default());

    assert_eq!(call(&app, "CreatePlayer", player("p1", "Aria")).await.0, StatusCode::OK);
    let res = call(&app, "CreatePlayer", player("p1", "Other")).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");

    let stored: Value = serde_json::from_str(&store.peek("p1").await.expect("stored")).unwrap();
    assert_eq!(stored["name"], "Aria");
}

#[tokio::test]
async fn update_of_missing_player_is_invalid_and_writes_nothing() {
    let store = MemoryStore::new();
    let app = app_with(&store, DirectoryConfig::default());

    let res = call(&app, "UpdatePlayer", player("ghost", "Aria")).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn update_overwrites_every_field() {
    let store = MemoryStore::new();
    let app = app_with(&store, DirectoryConfig::default());

    let full = json!({
        "id": {"id": "p1"},
        "name": "Aria",
        "avatarUrl": "https://cdn.example.com/a.png",
        "level": 4,
        "attributes": {"faction": "north"}
    });
    assert_eq!(call(&app, "CreatePlayer", full).await.0, StatusCode::OK);
    assert_eq!(call(&app, "UpdatePlayer", player("p1", "Aria")).await.0, StatusCode::OK);

    let stored: Value = serde_json::from_str(&store.peek("p1").await.expect("stored")).unwrap();
    assert_eq!(
        stored,
        json!({"id": {"id": "p1"}, "name": "Aria", "avatarUrl": "", "level": 0, "attributes": {}})
    );
}

#[tokio::test]
async fn create_without_id_returns_assigned_id() {
    let store = MemoryStore::new();
    let app = app_with(&store, DirectoryConfig::default());

    let (status, created) = call(&app, "CreatePlayer", json!({"name": "Aria"})).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"]["id"].as_str().expect("id assigned").to_string();
    assert!(!id.is_empty());

    let (status, fetched) = call(&app, "GetPlayer", json!({"id": id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Aria");
}

#[tokio::test]
async fn delete_of_missing_player_is_not_found() {
    let app = app_with(&MemoryStore::new(), DirectoryConfig::default());
    let res = call(&app, "DeletePlayer", json!({"id": "ghost"})).await;
    assert_rpc_error(&res, StatusCode::NOT_FOUND, "not_found");
}

#[tokio::test]
async fn unparsable_bodies_are_invalid_argument() {
    let app = app_with(&MemoryStore::new(), DirectoryConfig::default());

    let req = Request::builder()
        .method("POST")
        .uri("/directory.Directory/CreatePlayer")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    assert_rpc_error(&send(&app, req).await, StatusCode::BAD_REQUEST, "invalid_argument");

    let req = Request::builder()
        .method("POST")
        .uri("/directory.Directory/GetPlayer")
        .body(Body::from(r#"{"id":"p1"}"#))
        .unwrap();
    assert_rpc_error(&send(&app, req).await, StatusCode::BAD_REQUEST, "invalid_argument");

    let res = call(&app, "CreatePlayer", json!({"name": "Aria", "level": "high"})).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
}

#[tokio::test]
async fn malformed_stored_record_is_internal() {
    let store = MemoryStore::new();
    store.seed("p1", "{broken").await;
    let app = app_with(&store, DirectoryConfig::default());

    let res = call(&app, "GetPlayer", json!({"id": "p1"})).await;
    assert_rpc_error(&res, StatusCode::INTERNAL_SERVER_ERROR, "internal");
}

#[tokio::test]
async fn unique_name_policy_is_configurable() {
    let cfg = DirectoryConfig { enforce_unique_name: true, ..Default::default() };
    let app = app_with(&MemoryStore::new(), cfg);

    assert_eq!(call(&app, "CreatePlayer", player("p1", "Aria")).await.0, StatusCode::OK);
    let res = call(&app, "CreatePlayer", player("p2", "Aria")).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
    assert_eq!(res.1["message"], "Name is already taken, please try again");

    // default policy only checks ids
    let app = app_with(&MemoryStore::new(), DirectoryConfig::default());
    assert_eq!(call(&app, "CreatePlayer", player("p1", "Aria")).await.0, StatusCode::OK);
    assert_eq!(call(&app, "CreatePlayer", player("p2", "Aria")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn name_index_keys_are_not_addressable_as_players() {
    let store = MemoryStore::new();
    let cfg = DirectoryConfig { enforce_unique_name: true, ..Default::default() };
    let app = app_with(&store, cfg);

    assert_eq!(call(&app, "CreatePlayer", player("p1", "Aria")).await.0, StatusCode::OK);

    let res = call(&app, "DeletePlayer", json!({"id": "directory:name:Aria"})).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
    assert_eq!(res.1["message"], "ID is reserved, please try again");

    let res = call(&app, "CreatePlayer", player("p2", "Aria")).await;
    assert_rpc_error(&res, StatusCode::BAD_REQUEST, "invalid_argument");
    assert_eq!(store.peek("directory:name:Aria").await.as_deref(), Some("p1"));
}

struct DownStore;

#[async_trait]
impl RecordStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> { Err(StoreError::Backend("connection refused".into())) }
    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> { Err(StoreError::Backend("connection refused".into())) }
    async fn set_if_absent(&self, _key: &str, _value: &str) -> Result<bool, StoreError> { Err(StoreError::Backend("connection refused".into())) }
    async fn set_if_present(&self, _key: &str, _value: &str) -> Result<bool, StoreError> { Err(StoreError::Timeout(std::time::Duration::from_millis(5))) }
    async fn delete(&self, _key: &str) -> Result<bool, StoreError> { Err(StoreError::Backend("connection refused".into())) }
    async fn ping(&self) -> Result<(), StoreError> { Err(StoreError::Backend("connection refused".into())) }
}

#[tokio::test]
async fn store_outages_surface_as_unavailable_or_deadline() {
    let app = server::startup::app(Arc::new(DownStore), &DirectoryConfig::default());

    let res = call(&app, "GetPlayer", json!({"id": "p1"})).await;
    assert_rpc_error(&res, StatusCode::SERVICE_UNAVAILABLE, "unavailable");

    let res = call(&app, "CreatePlayer", player("p1", "Aria")).await;
    assert_rpc_error(&res, StatusCode::SERVICE_UNAVAILABLE, "unavailable");

    let res = call(&app, "UpdatePlayer", player("p1", "Aria")).await;
    assert_rpc_error(&res, StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded");
}
