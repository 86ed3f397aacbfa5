#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use escala_vigilantes_lib::app::{build_router, AppState};
use escala_vigilantes_lib::db::{DocumentStore, MemoryStore};
use escala_vigilantes_lib::service::RosterService;
use std::sync::Arc;

pub const DEFAULT_PASSWORD: &str = "123456";

pub fn app_with_store(store: Arc<dyn DocumentStore>) -> Router {
    build_router(AppState {
        service: RosterService::new(store, DEFAULT_PASSWORD),
    })
}

pub fn memory_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (app_with_store(store.clone()), store)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
