use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AccessGuard;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::health::{HealthStatus, ServiceClock};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::model::{NewTodo, NewUser, Todo, TodoPatch, User, UserPatch};
use crate::response::DeleteResponse;
use crate::seed::seed_demo_data;
use crate::store::EntityStore;
use crate::validation::{EntityPath, JsonBody, ListQuery, TodoQuery, UserQuery};

/// Application context shared by every request.
///
/// The store lock is held for the whole of each operation, so a cascade
/// delete is never observed half-applied.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<EntityStore>>,
    pub metrics: Arc<MetricsCollector>,
    pub guard: AccessGuard,
    pub clock: ServiceClock,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let mut store = EntityStore::new();
        if config.seed {
            seed_demo_data(&mut store)?;
            info!(
                users = store.user_count(),
                todos = store.todo_count(),
                "Seeded demo data"
            );
        }

        let clock = ServiceClock::start();
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            metrics: Arc::new(MetricsCollector::new(clock)),
            guard: AccessGuard::new(config.api_key.as_str()),
            clock,
        })
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.clock.check_health())
}

pub async fn stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    let snapshot = state.metrics.snapshot().await;
    Json(snapshot)
}

pub async fn list_users(
    State(state): State<AppState>,
    ListQuery(query): ListQuery<UserQuery>,
) -> Json<Vec<User>> {
    let store = state.store.read().await;
    Json(store.list_users(query.q.as_deref()))
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.store.write().await.create_user(payload)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> Result<Json<User>> {
    let store = state.store.read().await;
    store.get_user(&id).map(Json)
}

pub async fn update_user(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
    JsonBody(patch): JsonBody<UserPatch>,
) -> Result<Json<User>> {
    let mut store = state.store.write().await;
    store.update_user(&id, patch).map(Json)
}

pub async fn delete_user(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> Result<Json<DeleteResponse>> {
    state.store.write().await.delete_user(&id)?;
    Ok(Json(DeleteResponse::ok()))
}

pub async fn list_todos(
    State(state): State<AppState>,
    ListQuery(query): ListQuery<TodoQuery>,
) -> Json<Vec<Todo>> {
    let filter = query.into_filter();
    let store = state.store.read().await;
    Json(store.list_todos(&filter))
}

pub async fn create_todo(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewTodo>,
) -> Result<(StatusCode, Json<Todo>)> {
    let todo = state.store.write().await.create_todo(payload)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> Result<Json<Todo>> {
    let store = state.store.read().await;
    store.get_todo(&id).map(Json)
}

pub async fn update_todo(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
    JsonBody(patch): JsonBody<TodoPatch>,
) -> Result<Json<Todo>> {
    let mut store = state.store.write().await;
    store.update_todo(&id, patch).map(Json)
}

pub async fn delete_todo(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> Result<Json<DeleteResponse>> {
    state.store.write().await.delete_todo(&id)?;
    Ok(Json(DeleteResponse::ok()))
}

/// Fallback for paths that match neither a route nor a static file
pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
