use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::seed::{seed_sample_data, SeedError};
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{SqlTodoItemProvider, SqlUserProvider, TodoItemProvider, UserProvider};

/// Shared handler state: configuration, the pool and the providers built on it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: DatabaseManager,
    pub users: Arc<dyn UserProvider>,
    pub todo_items: Arc<dyn TodoItemProvider>,
}

impl AppState {
    pub fn new(config: AppConfig, database: DatabaseManager) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(SqlUserProvider::new(database.clone())),
            todo_items: Arc::new(SqlTodoItemProvider::new(database.clone())),
            database,
        }
    }

    /// Connect to the configured store and load sample data when enabled.
    pub async fn initialize(config: AppConfig) -> Result<Self, SeedError> {
        let database = DatabaseManager::connect(&config.database).await?;

        if config.database.seed_sample_data && seed_sample_data(&database).await? {
            info!("Seeded sample users and to-do items");
        }

        Ok(Self::new(config, database))
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(todo_item_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security.cors_origins));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/authentication/login", post(auth::login_post))
        .route("/api/authentication/register", post(auth::register_post))
}

fn todo_item_routes(state: AppState) -> Router<AppState> {
    use protected::todo_items;

    Router::new()
        .route(
            "/api/todoitems",
            get(todo_items::collection_get).post(todo_items::collection_post),
        )
        .route(
            "/api/todoitems/:id",
            get(todo_items::item_get)
                .put(todo_items::item_put)
                .delete(todo_items::item_delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

/// `*` allows any origin; otherwise only the listed origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "To-Do API (Rust)",
            "version": version,
            "description": "Multi-user to-do list REST API with JWT authentication",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/authentication/login, /api/authentication/register (public)",
                "todoitems": "/api/todoitems[/:id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.database.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
