use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::adapters::response::{ApiError, ApiResponse, Operation, INVALID_ID_MESSAGE};
use crate::config::AppConfig;
use crate::core::{Todo, TodoChanges};
use crate::services::TodoService;

#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&AppConfig> for HttpServerConfig {
    fn from(config: &AppConfig) -> Self {
        Self { host: config.host.clone(), port: config.port }
    }
}

pub struct AppState<S: TodoService> {
    pub todo_service: Arc<S>,
}

impl<S: TodoService> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self { todo_service: Arc::clone(&self.todo_service) }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

fn todo_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(_rejection) => {
            #[cfg(feature = "tracing")]
            debug!(error = %_rejection, "Rejected todo id");
            Err(ApiError::bad_request(INVALID_ID_MESSAGE))
        }
    }
}

fn json_body<T>(
    body: Result<Json<T>, JsonRejection>,
    operation: Operation,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(_rejection) => {
            #[cfg(feature = "tracing")]
            debug!(error = %_rejection, ?operation, "Rejected request body");
            Err(ApiError::bad_request(operation.rejected()))
        }
    }
}

#[cfg_attr(feature = "tracing", instrument(skip(state)))]
pub async fn get_todos<S: TodoService>(
    State(state): State<AppState<S>>,
) -> Result<ApiResponse<Vec<Todo>>, ApiError> {
    let todos = state
        .todo_service
        .find_all()
        .await
        .map_err(|e| ApiError::from_todo_error(Operation::GetAll, e))?;
    Ok(ApiResponse::ok("get all todo", todos))
}

#[cfg_attr(feature = "tracing", instrument(skip(state, id)))]
pub async fn get_todo_by_id<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<Todo>, ApiError> {
    let id = todo_id(id)?;
    let todo = state
        .todo_service
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_todo_error(Operation::GetById, e))?;
    Ok(ApiResponse::ok("get todo by id", todo))
}

#[cfg_attr(feature = "tracing", instrument(skip(state, body)))]
pub async fn post_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<ApiResponse<Todo>, ApiError> {
    let body = json_body(body, Operation::Create)?;
    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request(Operation::Create.rejected()));
    }
    let todo = state
        .todo_service
        .create(&body.title, body.user_id)
        .await
        .map_err(|e| ApiError::from_todo_error(Operation::Create, e))?;
    #[cfg(feature = "tracing")]
    debug!(id = todo.id, "Todo created");
    Ok(ApiResponse::created("todo created", todo))
}

#[cfg_attr(feature = "tracing", instrument(skip(state, id, body)))]
pub async fn put_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoChanges>, JsonRejection>,
) -> Result<ApiResponse<Todo>, ApiError> {
    let id = todo_id(id)?;
    let changes = json_body(body, Operation::Update)?;
    let todo = state
        .todo_service
        .update(id, changes)
        .await
        .map_err(|e| ApiError::from_todo_error(Operation::Update, e))?;
    Ok(ApiResponse::created("todo created", todo))
}

#[cfg_attr(feature = "tracing", instrument(skip(state, id)))]
pub async fn delete_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = todo_id(id)?;
    state
        .todo_service
        .delete_by_id(id)
        .await
        .map_err(|e| ApiError::from_todo_error(Operation::Delete, e))?;
    Ok(ApiResponse::empty("delete todo by id"))
}

async fn health_route() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { message: "OK" }))
}

fn todo_routes<S: TodoService + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/todos", get(get_todos::<S>).post(post_todo::<S>))
        .route("/todos/", get(get_todos::<S>).post(post_todo::<S>))
        .route(
            "/todos/{id}",
            get(get_todo_by_id::<S>)
                .put(put_todo::<S>)
                .delete(delete_todo::<S>),
        )
}

/// Builds the application router around a todo service.
pub fn router<S: TodoService + 'static>(todo_service: Arc<S>) -> Router {
    let state = AppState { todo_service };
    let router = Router::new()
        .route("/health", get(health_route))
        .merge(todo_routes())
        .with_state(state)
        .layer(CorsLayer::permissive());

    #[cfg(feature = "tracing")]
    let router = router.layer(tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        },
    ));

    router
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<S: TodoService + 'static>(
        todo_service: S,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let router = router(Arc::new(todo_service));
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("failed to listen on {}:{}", config.host, config.port))?;
        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        #[cfg(feature = "tracing")]
        {
            if let Ok(addr) = self.listener.local_addr() {
                info!(addr = %addr, "HTTP server started");
            }
        }
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}
