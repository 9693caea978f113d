//! In-memory stand-in for the secrets backend, for tests.
//!
//! Speaks the same REST surface as the real service. State is shared with
//! the test through [`MockBackend`] so tests can seed users, keys and
//! secrets, or force every response to a fixed status and body.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Clone)]
struct MockUser {
    password: String,
    master_password: String,
}

#[derive(Debug, Clone)]
struct MockSecret {
    id: String,
    owner: String,
    name: String,
    value: String,
    category: String,
    description: String,
}

#[derive(Debug, Clone)]
struct MockKey {
    id: String,
    owner: String,
    name: String,
    key: String,
    revoked: bool,
}

#[derive(Debug, Default)]
struct MockState {
    users: HashMap<String, MockUser>,
    tokens: HashMap<String, String>,
    secrets: Vec<MockSecret>,
    keys: Vec<MockKey>,
    forced: Option<(StatusCode, String)>,
    hits: usize,
}

impl MockState {
    fn issue_token(&mut self, email: &str) -> String {
        let token = format!("tok_{}", uuid::Uuid::new_v4().simple());
        self.tokens.insert(token.clone(), email.to_string());
        token
    }

    fn owner_of(&self, headers: &HeaderMap) -> Result<String, ApiError> {
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let Some(bearer) = bearer else {
            return Err(error(StatusCode::UNAUTHORIZED, "missing credentials"));
        };
        if let Some(email) = self.tokens.get(bearer) {
            return Ok(email.clone());
        }
        self.keys
            .iter()
            .find(|k| k.key == bearer && !k.revoked)
            .map(|k| k.owner.clone())
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "invalid credentials"))
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// Handle to a running mock backend.
pub struct MockBackend {
    pub base_url: String,
    state: SharedState,
}

impl MockBackend {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Register a user and return a session token for it.
    pub fn register_user(&self, email: &str, password: &str, master_password: &str) -> String {
        let mut state = self.lock();
        state.users.insert(
            email.to_string(),
            MockUser {
                password: password.to_string(),
                master_password: master_password.to_string(),
            },
        );
        state.issue_token(email)
    }

    /// Issue an active API key for an existing user and return the raw key.
    pub fn issue_api_key(&self, email: &str, name: &str) -> String {
        let key = format!("sk_{}", uuid::Uuid::new_v4().simple());
        self.lock().keys.push(MockKey {
            id: uuid::Uuid::new_v4().to_string(),
            owner: email.to_string(),
            name: name.to_string(),
            key: key.clone(),
            revoked: false,
        });
        key
    }

    pub fn add_secret(&self, email: &str, name: &str, value: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.lock().secrets.push(MockSecret {
            id: id.clone(),
            owner: email.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            category: String::new(),
            description: String::new(),
        });
        id
    }

    /// Stored value of the secret named `name`, if any.
    pub fn secret_value(&self, name: &str) -> Option<String> {
        self.lock()
            .secrets
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value.clone())
    }

    pub fn secret_count(&self) -> usize {
        self.lock().secrets.len()
    }

    pub fn is_key_revoked(&self, name: &str) -> Option<bool> {
        self.lock()
            .keys
            .iter()
            .find(|k| k.name == name)
            .map(|k| k.revoked)
    }

    /// Answer every request (health included) with `status` and `body`.
    pub fn force_response(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        self.lock().forced = Some((status, body.to_string()));
    }

    pub fn clear_forced_response(&self) {
        self.lock().forced = None;
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.lock().hits
    }
}

/// Build the mock router over `state`.
fn mock_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/secrets", get(list_secrets).post(create_secret))
        .route("/api/v1/secrets/{id}", put(update_secret).delete(delete_secret))
        .route("/api/v1/apikeys", get(list_keys).post(create_key))
        .route("/api/v1/apikeys/{id}/revoke", post(revoke_key))
        .layer(middleware::from_fn_with_state(state.clone(), forced_response))
        .with_state(state)
}

/// Spawn the mock backend on a random port inside the current runtime.
pub async fn spawn_mock_backend() -> MockBackend {
    let state = SharedState::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = mock_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Spawn the mock backend on its own thread and runtime.
///
/// `BlockingHttpService` owns a tokio runtime and cannot be used inside
/// another one, so sync tests need the server to live elsewhere. The server
/// stays up for the rest of the test process.
pub fn spawn_blocking_mock_backend() -> MockBackend {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let backend = spawn_mock_backend().await;
            tx.send(backend).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}

fn error(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(json!({ "error": msg })))
}

async fn forced_response(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let forced = {
        let mut state = state.lock().unwrap();
        state.hits += 1;
        state.forced.clone()
    };
    match forced {
        Some((status, body)) => (status, body).into_response(),
        None => next.run(request).await,
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct AuthBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    master_password: String,
}

async fn signup(
    State(state): State<SharedState>,
    Json(body): Json<AuthBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.email.is_empty() || body.password.is_empty() || body.master_password.is_empty() {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "email, password and master password are required",
        ));
    }
    let mut state = state.lock().unwrap();
    if state.users.contains_key(&body.email) {
        return Err(error(StatusCode::CONFLICT, "email already registered"));
    }
    state.users.insert(
        body.email.clone(),
        MockUser {
            password: body.password,
            master_password: body.master_password,
        },
    );
    let token = state.issue_token(&body.email);
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

async fn login(
    State(state): State<SharedState>,
    Json(body): Json<AuthBody>,
) -> Result<Json<Value>, ApiError> {
    let mut state = state.lock().unwrap();
    let valid = state.users.get(&body.email).is_some_and(|u| {
        u.password == body.password && u.master_password == body.master_password
    });
    if !valid {
        return Err(error(StatusCode::UNAUTHORIZED, "invalid credentials"));
    }
    let token = state.issue_token(&body.email);
    Ok(Json(json!({ "token": token })))
}

async fn me(State(state): State<SharedState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let email = state.lock().unwrap().owner_of(&headers)?;
    Ok(Json(json!({ "email": email })))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<usize>,
    limit: Option<usize>,
    status: Option<String>,
}

impl ListParams {
    fn window<T: Clone>(&self, rows: Vec<T>) -> Vec<T> {
        let limit = self.limit.unwrap_or(20).max(1);
        let page = self.page.unwrap_or(1).max(1);
        rows.into_iter().skip((page - 1) * limit).take(limit).collect()
    }
}

fn secret_json(secret: &MockSecret) -> Value {
    json!({
        "id": secret.id,
        "name": secret.name,
        "category": secret.category,
        "description": secret.description,
        "created_at": Utc::now(),
        "updated_at": Utc::now(),
    })
}

fn key_json(key: &MockKey) -> Value {
    json!({
        "id": key.id,
        "name": key.name,
        "status": if key.revoked { "revoked" } else { "active" },
        "created_at": Utc::now(),
    })
}

async fn list_secrets(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let state = state.lock().unwrap();
    let owner = state.owner_of(&headers)?;
    let mine: Vec<_> = state.secrets.iter().filter(|s| s.owner == owner).cloned().collect();
    let total = mine.len();
    let rows: Vec<Value> = params.window(mine).iter().map(secret_json).collect();
    Ok(Json(json!({ "secrets": rows, "total": total })))
}

#[derive(Debug, Deserialize)]
struct SecretBody {
    name: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
}

fn check_master(state: &MockState, owner: &str, headers: &HeaderMap) -> Result<(), ApiError> {
    let supplied = headers
        .get("x-master-password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match state.users.get(owner) {
        Some(user) if user.master_password == supplied => Ok(()),
        _ => Err(error(StatusCode::FORBIDDEN, "invalid master password")),
    }
}

async fn create_secret(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<SecretBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut state = state.lock().unwrap();
    let owner = state.owner_of(&headers)?;
    check_master(&state, &owner, &headers)?;
    if body.name.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "name is required"));
    }
    let secret = MockSecret {
        id: uuid::Uuid::new_v4().to_string(),
        owner,
        name: body.name,
        value: body.value,
        category: body.category,
        description: body.description,
    };
    let out = secret_json(&secret);
    state.secrets.push(secret);
    Ok((StatusCode::CREATED, Json(out)))
}

async fn update_secret(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<SecretBody>,
) -> Result<Json<Value>, ApiError> {
    let mut state = state.lock().unwrap();
    let owner = state.owner_of(&headers)?;
    check_master(&state, &owner, &headers)?;
    let secret = state
        .secrets
        .iter_mut()
        .find(|s| s.id == id && s.owner == owner)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "secret not found"))?;
    secret.name = body.name;
    secret.value = body.value;
    secret.category = body.category;
    secret.description = body.description;
    Ok(Json(secret_json(secret)))
}

async fn delete_secret(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut state = state.lock().unwrap();
    let owner = state.owner_of(&headers)?;
    let before = state.secrets.len();
    state.secrets.retain(|s| !(s.id == id && s.owner == owner));
    if state.secrets.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "secret not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_keys(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let state = state.lock().unwrap();
    let owner = state.owner_of(&headers)?;
    let mine: Vec<_> = state
        .keys
        .iter()
        .filter(|k| k.owner == owner)
        .filter(|k| match params.status.as_deref() {
            Some("active") => !k.revoked,
            Some("revoked") => k.revoked,
            _ => true,
        })
        .cloned()
        .collect();
    let rows: Vec<Value> = params.window(mine).iter().map(key_json).collect();
    Ok(Json(json!({ "api_keys": rows })))
}

#[derive(Debug, Deserialize)]
struct KeyBody {
    #[serde(default)]
    name: String,
}

async fn create_key(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<KeyBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut state = state.lock().unwrap();
    let owner = state.owner_of(&headers)?;
    if body.name.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "name is required"));
    }
    let key = MockKey {
        id: uuid::Uuid::new_v4().to_string(),
        owner,
        name: body.name,
        key: format!("sk_{}", uuid::Uuid::new_v4().simple()),
        revoked: false,
    };
    let mut out = key_json(&key);
    out["key"] = json!(key.key);
    state.keys.push(key);
    Ok((StatusCode::CREATED, Json(out)))
}

async fn revoke_key(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut state = state.lock().unwrap();
    let owner = state.owner_of(&headers)?;
    let key = state
        .keys
        .iter_mut()
        .find(|k| k.id == id && k.owner == owner)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "api key not found"))?;
    key.revoked = true;
    Ok(Json(key_json(key)))
}
