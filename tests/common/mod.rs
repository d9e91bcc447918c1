// In-process mock of the operations API plus a scripted operator.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use opsconsole::auth::{MemoryTokenStore, TokenStore};
use opsconsole::config::{ApiConfig, EnvironmentSettings, LoggingConfig, SessionConfig};
use opsconsole::interaction::Interaction;
use opsconsole::{Config, ConsoleState};

pub const TOKEN: &str = "tok-admin";
pub const VALID_KEY: &str = "LIC-VALID";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

#[derive(Default)]
pub struct Backend {
    requests: Mutex<Vec<Recorded>>,
    customers: Mutex<Vec<Value>>,
    environments: Mutex<Vec<Value>>,
    licenses: Mutex<Vec<Value>>,
    next_id: AtomicI64,
    pub fail_logout: AtomicBool,
    pub fail_start: AtomicBool,
}

impl Backend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests with this method whose path starts with `prefix`.
    pub fn count(&self, method: &str, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }

    pub fn seed_customer(&self, customer_id: &str, name: &str, deployment_type: &str) -> i64 {
        let id = self.id();
        self.customers.lock().unwrap().push(json!({
            "id": id,
            "customer_id": customer_id,
            "name": name,
            "contact_email": format!("{}@example.com", customer_id.to_lowercase()),
            "deployment_type": deployment_type,
            "status": "active",
            "environments_count": 0,
            "is_active": true,
        }));
        id
    }

    pub fn seed_environment(&self, customer: i64, release_name: &str, status: &str) -> i64 {
        let id = self.id();
        let mut env = environment_payload(customer, release_name);
        env["id"] = json!(id);
        env["status"] = json!(status);
        self.environments.lock().unwrap().push(env);
        id
    }

    pub fn environment_status(&self, id: i64) -> Option<String> {
        self.environments
            .lock()
            .unwrap()
            .iter()
            .find(|e| e["id"] == json!(id))
            .and_then(|e| e["status"].as_str().map(str::to_string))
    }

    pub fn license_count(&self) -> usize {
        self.licenses.lock().unwrap().len()
    }

    pub fn last_license(&self) -> Option<Value> {
        self.licenses.lock().unwrap().last().cloned()
    }

    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub fn environment_payload(customer: i64, release_name: &str) -> Value {
    json!({
        "customer": customer,
        "customer_name": "Acme",
        "release_name": release_name,
        "namespace": "odoo",
        "domain": format!("{}.erp.mmiao.net", release_name),
        "odoo_version": "18.0",
        "workers": 0,
        "log_level": "info",
        "git_ssh_secret": "global-git-ssh-key",
        "git_odoo_repository": "git@github.com:ShanghaiMeowAI/MeowCloud.git",
        "git_odoo_ref": "18.0",
        "git_customer_addons": [],
        "storage_class": "longhorn-expandable",
        "storage_size": "10Gi",
        "storage_auto_expand": true,
        "storage_expand_threshold": 85,
        "storage_expand_size": "5Gi",
        "storage_max_size": "50Gi",
        "db_enabled": true,
        "db_version": "16",
        "db_instances": 1,
        "db_storage_size": "5Gi",
        "db_cpu_request": "100m",
        "db_memory_request": "256Mi",
        "db_cpu_limit": "500m",
        "db_memory_limit": "512Mi",
        "external_db_enabled": false,
        "external_db_port": 5432,
        "ingress_enabled": false,
        "ingress_class": "nginx",
        "ingress_path": "/",
        "tls_enabled": false,
        "cpu_request": "200m",
        "memory_request": "512Mi",
        "cpu_limit": "1000m",
        "memory_limit": "2Gi",
        "limit_request": 8192,
        "limit_memory_hard": "2684354560",
        "limit_memory_soft": "2147483648",
        "proxy_mode": false,
        "list_db": false,
        "status": "pending",
    })
}

fn admin_user() -> Value {
    json!({
        "id": 1,
        "username": "admin",
        "email": "admin@example.com",
        "first_name": "Ada",
        "last_name": "Admin",
        "is_active": true,
        "profile": {
            "role": "admin",
            "can_manage_customers": true,
            "can_manage_environments": true,
            "can_view_logs": true,
            "can_generate_licenses": true,
        },
    })
}

fn page(results: Vec<Value>) -> Value {
    json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results,
    })
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

fn matches(item: &Value, query: &HashMap<String, String>) -> bool {
    query.iter().all(|(key, wanted)| match key.as_str() {
        "page" => true,
        "search" => ["name", "customer_id", "release_name", "license_key", "username"]
            .iter()
            .any(|f| item[*f].as_str().map_or(false, |s| s.contains(wanted.as_str()))),
        _ => match &item[key.as_str()] {
            Value::String(s) => s == wanted,
            Value::Null => false,
            other => other.to_string() == *wanted,
        },
    })
}

type Shared = State<Arc<Backend>>;

async fn record(State(backend): Shared, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    backend.requests.lock().unwrap().push(Recorded {
        method: request.method().to_string(),
        path: path.clone(),
        query: request.uri().query().map(str::to_string),
    });

    let public = path == "/api/login/" || path == "/api/health/";
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Token {}", TOKEN));
    if !public && !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid token." })),
        )
            .into_response();
    }
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "secret" {
        Json(json!({ "token": TOKEN, "user": admin_user() })).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn logout(State(backend): Shared) -> Response {
    if backend.fail_logout.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({ "message": "Logged out" })).into_response()
}

async fn me() -> Json<Value> {
    Json(admin_user())
}

async fn list_users() -> Json<Value> {
    Json(page(vec![admin_user()]))
}

async fn reset_password(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!({ "message": "Password reset" }))
}

async fn list_customers(State(backend): Shared, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let items = backend.customers.lock().unwrap();
    Json(page(items.iter().filter(|c| matches(c, &q)).cloned().collect()))
}

async fn create_customer(State(backend): Shared, Json(mut body): Json<Value>) -> Response {
    let mut customers = backend.customers.lock().unwrap();
    if customers.iter().any(|c| c["customer_id"] == body["customer_id"]) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "customer_id": ["customer with this customer id already exists."] })),
        )
            .into_response();
    }
    body["id"] = json!(backend.id());
    body["environments_count"] = json!(0);
    body["is_active"] = json!(true);
    customers.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_customer(State(backend): Shared, Path(id): Path<i64>) -> Response {
    let customers = backend.customers.lock().unwrap();
    match customers.iter().find(|c| c["id"] == json!(id)) {
        Some(c) => Json(c.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_customer(State(backend): Shared, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    let mut customers = backend.customers.lock().unwrap();
    match customers.iter_mut().find(|c| c["id"] == json!(id)) {
        Some(c) => {
            if let (Some(target), Some(fields)) = (c.as_object_mut(), body.as_object()) {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            Json(c.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_customer(State(backend): Shared, Path(id): Path<i64>) -> StatusCode {
    backend.customers.lock().unwrap().retain(|c| c["id"] != json!(id));
    StatusCode::NO_CONTENT
}

async fn customer_stats(State(backend): Shared) -> Json<Value> {
    let total = backend.customers.lock().unwrap().len();
    Json(json!({ "total_customers": total, "active_customers": total }))
}

async fn list_environments(State(backend): Shared, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let items = backend.environments.lock().unwrap();
    Json(page(items.iter().filter(|e| matches(e, &q)).cloned().collect()))
}

async fn create_environment(State(backend): Shared, Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(backend.id());
    body["status"] = json!("pending");
    body["customer_name"] = json!("Acme");
    body["is_running"] = json!(false);
    backend.environments.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_environment(State(backend): Shared, Path(id): Path<i64>) -> Response {
    let environments = backend.environments.lock().unwrap();
    match environments.iter().find(|e| e["id"] == json!(id)) {
        Some(e) => Json(e.clone()).into_response(),
        None => not_found(),
    }
}

async fn delete_environment(State(backend): Shared, Path(id): Path<i64>) -> StatusCode {
    backend.environments.lock().unwrap().retain(|e| e["id"] != json!(id));
    StatusCode::NO_CONTENT
}

fn set_environment_status(backend: &Backend, id: i64, status: &str) -> Response {
    let mut environments = backend.environments.lock().unwrap();
    match environments.iter_mut().find(|e| e["id"] == json!(id)) {
        Some(e) => {
            e["status"] = json!(status);
            e["is_running"] = json!(status == "running");
            Json(e.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn start_environment(State(backend): Shared, Path(id): Path<i64>) -> Response {
    if backend.fail_start.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "helm upgrade failed" })),
        )
            .into_response();
    }
    set_environment_status(&backend, id, "running")
}

async fn stop_environment(State(backend): Shared, Path(id): Path<i64>) -> Response {
    set_environment_status(&backend, id, "stopped")
}

async fn health_check_environment(State(backend): Shared, Path(id): Path<i64>) -> Response {
    let environments = backend.environments.lock().unwrap();
    match environments.iter().find(|e| e["id"] == json!(id)) {
        Some(e) => Json(json!({
            "status": e["status"],
            "message": "reachable",
            "last_check": "2025-03-10T08:00:00Z",
        }))
        .into_response(),
        None => not_found(),
    }
}

async fn environment_stats(State(backend): Shared) -> Json<Value> {
    let environments = backend.environments.lock().unwrap();
    let running = environments.iter().filter(|e| e["status"] == "running").count();
    Json(json!({
        "total_environments": environments.len(),
        "running_environments": running,
    }))
}

async fn list_licenses(State(backend): Shared, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let items = backend.licenses.lock().unwrap();
    Json(page(items.iter().filter(|l| matches(l, &q)).cloned().collect()))
}

async fn create_license(State(backend): Shared, Json(mut body): Json<Value>) -> Response {
    let id = backend.id();
    for field in ["valid_from", "valid_until"] {
        if let Some(date) = body[field].as_str().map(str::to_string) {
            body[field] = json!(format!("{}T00:00:00Z", date));
        }
    }
    body["id"] = json!(id);
    body["license_key"] = json!(format!("LIC-{:04}", id));
    body["status"] = json!("pending");
    backend.licenses.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn revoke_license(State(backend): Shared, Path(id): Path<i64>) -> Response {
    let mut licenses = backend.licenses.lock().unwrap();
    match licenses.iter_mut().find(|l| l["id"] == json!(id)) {
        Some(l) => {
            l["status"] = json!("revoked");
            Json(json!({ "message": "License revoked" })).into_response()
        }
        None => not_found(),
    }
}

async fn validate_license(Json(body): Json<Value>) -> Response {
    if body["license_key"] == VALID_KEY {
        Json(json!({
            "valid": true,
            "license_type": "standard",
            "max_users": 50,
            "max_companies": 3,
            "max_storage_gb": 100,
            "modules_enabled": ["sale"],
            "valid_until": "2026-03-10T00:00:00Z",
            "days_remaining": 365,
        }))
        .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "valid": false, "error": "License not found" })),
        )
            .into_response()
    }
}

async fn license_stats(State(backend): Shared) -> Json<Value> {
    Json(json!({ "total_licenses": backend.licenses.lock().unwrap().len() }))
}

async fn list_activity_logs() -> Json<Value> {
    Json(page(vec![json!({
        "id": 1,
        "user": 1,
        "user_name": "admin",
        "action": "create",
        "target_type": "customer",
        "target_id": "1",
        "description": "Created customer Acme",
        "created_at": "2025-03-10T08:00:00Z",
    })]))
}

async fn system_settings() -> Json<Value> {
    Json(json!({
        "id": 1,
        "site_name": "Ops",
        "site_description": "",
        "admin_email": "ops@example.com",
        "maintenance_mode": false,
        "max_upload_size": 100,
        "session_timeout": 30,
        "backup_enabled": true,
        "backup_frequency": "daily",
        "log_retention_days": 30,
        "email_notifications": false,
        "smtp_host": "",
        "smtp_port": 587,
        "smtp_use_tls": true,
        "smtp_username": "",
        "smtp_password": "",
    }))
}

async fn clean_logs(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "message": format!("kept {} days", body["days"]), "deleted_count": 12 }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/login/", post(login))
        .route("/api/logout/", post(logout))
        .route("/api/health/", get(health))
        .route("/api/users/me/", get(me))
        .route("/api/users/", get(list_users))
        .route("/api/users/:id/reset_password/", post(reset_password))
        .route("/api/customers/", get(list_customers).post(create_customer))
        .route("/api/customers/stats/", get(customer_stats))
        .route(
            "/api/customers/:id/",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/api/environments/", get(list_environments).post(create_environment))
        .route("/api/environments/stats/", get(environment_stats))
        .route(
            "/api/environments/:id/",
            get(get_environment).delete(delete_environment),
        )
        .route("/api/environments/:id/start/", post(start_environment))
        .route("/api/environments/:id/stop/", post(stop_environment))
        .route("/api/environments/:id/health_check/", post(health_check_environment))
        .route("/api/licenses/", get(list_licenses).post(create_license))
        .route("/api/licenses/stats/", get(license_stats))
        .route("/api/licenses/validate_license/", post(validate_license))
        .route("/api/licenses/:id/revoke/", post(revoke_license))
        .route("/api/user-activity-logs/", get(list_activity_logs))
        .route("/api/system/settings/", get(system_settings))
        .route("/api/system/clean-logs/", post(clean_logs))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .layer(TraceLayer::new_for_http())
        .with_state(backend)
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

pub async fn spawn() -> TestServer {
    let backend = Arc::new(Backend::default());
    let app = router(backend.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{}/api", addr),
        backend,
    }
}

pub fn config(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
        },
        session: SessionConfig {
            token_dir: PathBuf::from("."),
            token_key: "token".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        environment: EnvironmentSettings::default(),
    }
}

/// A console signed in as `admin` against `server`.
pub async fn signed_in(server: &TestServer, operator: Arc<ScriptedInteraction>) -> ConsoleState {
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::default());
    let state = ConsoleState::with_store(config(&server.base_url), store, operator);
    state
        .session
        .login("admin", &SecretString::new("secret".to_string()))
        .await
        .unwrap();
    state
}

/// Operator with pre-recorded answers. Unanswered confirmations are
/// declined and unanswered prompts dismissed.
#[derive(Default)]
pub struct ScriptedInteraction {
    confirms: Mutex<VecDeque<bool>>,
    prompts: Mutex<VecDeque<Option<String>>>,
    pub asked: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer_confirm(&self, yes: bool) -> &Self {
        self.confirms.lock().unwrap().push_back(yes);
        self
    }

    pub fn answer_prompt(&self, answer: Option<&str>) -> &Self {
        self.prompts
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Interaction for ScriptedInteraction {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.confirms.lock().unwrap().pop_front().unwrap_or(false)
    }

    fn prompt(&self, message: &str, _default: Option<&str>) -> Option<String> {
        self.asked.lock().unwrap().push(message.to_string());
        self.prompts.lock().unwrap().pop_front().flatten()
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
