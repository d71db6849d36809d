// Allow dead code: each test binary uses a different subset of the stub
#![allow(dead_code)]

//! In-process stub of the todolink backend for integration tests.
//!
//! Scripts the auth and todo endpoints, counts per-endpoint hits, and lets
//! tests control which access tokens the data endpoints accept and whether
//! the refresh exchange succeeds.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

pub const VALID_USERNAME: &str = "alice";
pub const VALID_PASSWORD: &str = "Secr3t!23";
pub const FIRST_TOKEN: &str = "token-1";
pub const REFRESHED_TOKEN: &str = "token-2";
pub const REFRESH_COOKIE: &str = "refresh_token=refresh-1";

#[derive(Default)]
pub struct Counters {
    pub login: AtomicUsize,
    pub register: AtomicUsize,
    pub refresh: AtomicUsize,
    pub list: AtomicUsize,
    pub create: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

pub struct BackendState {
    pub counters: Counters,
    /// Tokens the data endpoints currently accept
    pub accepted_tokens: Mutex<Vec<String>>,
    /// Whether /auth/refresh succeeds at all
    pub allow_refresh: AtomicBool,
    /// Whether a successfully issued refresh token is also accepted by the
    /// data endpoints (disabled to exercise the 401-after-retry path)
    pub accept_refreshed: AtomicBool,
    /// Whether /auth/refresh answers with an unusable (non-JSON) body,
    /// simulating a response that never arrives intact
    pub garble_refresh: AtomicBool,
    /// Token handed out by the next successful refresh
    pub next_refresh_token: Mutex<String>,
    /// Artificial refresh latency, to widen the single-flight race window
    pub refresh_delay_ms: AtomicUsize,
    /// Query parameters seen by the most recent list request
    pub last_list_query: Mutex<Option<HashMap<String, String>>>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            counters: Counters::default(),
            accepted_tokens: Mutex::new(Vec::new()),
            allow_refresh: AtomicBool::new(true),
            accept_refreshed: AtomicBool::new(true),
            garble_refresh: AtomicBool::new(false),
            next_refresh_token: Mutex::new(REFRESHED_TOKEN.to_string()),
            refresh_delay_ms: AtomicUsize::new(0),
            last_list_query: Mutex::new(None),
        }
    }

    /// Simulate server-side expiry of every outstanding access token.
    pub fn expire_tokens(&self) {
        self.accepted_tokens.lock().unwrap().clear();
    }
}

pub struct StubBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl StubBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

pub async fn spawn_backend() -> StubBackend {
    let state = Arc::new(BackendState::new());
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/create", post(create_account))
        .route("/auth/refresh", post(refresh))
        .route("/todos/all-todo", get(list_todos))
        .route("/todos/create-todo", post(create_todo))
        .route("/todos/update-todo/:id", patch(update_todo))
        .route("/todos/delete-todo/:id", delete(delete_todo))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub backend");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub backend died");
    });

    StubBackend { addr, state }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn authorized(state: &BackendState, headers: &HeaderMap) -> bool {
    match bearer_token(headers) {
        Some(token) => state.accepted_tokens.lock().unwrap().contains(&token),
        None => false,
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
        .into_response()
}

pub fn sample_todo_json() -> Value {
    json!({
        "id": "1",
        "title": "Learn",
        "description": "Read the borrow checker chapter again",
        "priority": 3,
        "complete": false,
        "categories": "WORK",
        "deadline": "2025-12-01T00:00:00Z"
    })
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(state): State<Arc<BackendState>>, Form(form): Form<LoginForm>) -> Response {
    state.counters.login.fetch_add(1, Ordering::SeqCst);
    if form.username != VALID_USERNAME || form.password != VALID_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        )
            .into_response();
    }

    state
        .accepted_tokens
        .lock()
        .unwrap()
        .push(FIRST_TOKEN.to_string());
    let cookie = [(
        header::SET_COOKIE,
        format!("{}; Path=/; HttpOnly", REFRESH_COOKIE),
    )];
    (
        StatusCode::OK,
        cookie,
        Json(json!({"access_token": FIRST_TOKEN, "token_type": "bearer"})),
    )
        .into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    username: String,
    #[allow(dead_code)]
    password: String,
}

async fn create_account(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<RegisterBody>,
) -> Response {
    state.counters.register.fetch_add(1, Ordering::SeqCst);
    if body.username == "taken" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"detail": "Username already registered"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": 1, "email": body.email, "username": body.username})),
    )
        .into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.counters.refresh.fetch_add(1, Ordering::SeqCst);

    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;
    }

    let cookie_ok = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.contains(REFRESH_COOKIE))
        .unwrap_or(false);
    if !cookie_ok || !state.allow_refresh.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.garble_refresh.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<!-- not json -->").into_response();
    }

    let token = state.next_refresh_token.lock().unwrap().clone();
    if state.accept_refreshed.load(Ordering::SeqCst) {
        state.accepted_tokens.lock().unwrap().push(token.clone());
    }
    Json(json!({"access_token": token})).into_response()
}

async fn list_todos(
    State(state): State<Arc<BackendState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.counters.list.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if query.get("search").map(String::as_str) == Some("boom") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "kaboom"})),
        )
            .into_response();
    }
    *state.last_list_query.lock().unwrap() = Some(query);
    Json(json!([sample_todo_json()])).into_response()
}

async fn create_todo(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.counters.create.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut todo = body;
    todo["id"] = json!("generated-1");
    todo["complete"] = json!(false);
    (StatusCode::CREATED, Json(todo)).into_response()
}

async fn update_todo(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    state.counters.update.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut todo = sample_todo_json();
    todo["id"] = json!(id);
    if let Some(fields) = patch.as_object() {
        for (key, value) in fields {
            todo[key.as_str()] = value.clone();
        }
    }
    Json(todo).into_response()
}

async fn delete_todo(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.counters.delete.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}
