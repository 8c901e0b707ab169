//! HTTP routes for todo use-cases.
//!
//! # Responsibility
//! - Map REST paths, query strings and JSON bodies onto `TodoService` calls.
//! - Keep request handling non-blocking by running store work on tokio's
//!   blocking pool.
//!
//! # Invariants
//! - Every path is served with and without a trailing slash.
//! - Message and error bodies are plain text; entity payloads are JSON.
//! - Handlers never touch SQLite directly; the shared `TodoStore` owns it.

use crate::error::ApiResult;
use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use todo_core::{
    NewTodo, RepoResult, SqliteTodoRepository, Todo, TodoFilterParams, TodoId, TodoPatch,
    TodoService, TodoStore, TodoSummary,
};

const CREATED_MESSAGE: &str = "Todo Successfully Added";
const DELETED_MESSAGE: &str = "Todo Deleted";

/// Router state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<TodoStore>,
}

/// Query string of the filtered listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search_q: Option<String>,
}

/// Query string of the priority/status summary listing.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub priority: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgendaQuery {
    pub date: Option<String>,
}

/// Builds the todo router over an explicitly opened store.
pub fn router(store: Arc<TodoStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route("/todos/status/priority", get(list_by_priority_and_status))
        .route("/todos/status/priority/", get(list_by_priority_and_status))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route(
            "/todos/:id/",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/agenda", get(agenda))
        .route("/agenda/", get(agenda))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListTodosQuery>,
) -> ApiResult<Json<Vec<Todo>>> {
    let params = TodoFilterParams {
        status: query.status,
        priority: query.priority,
        category: query.category,
        search: query.search_q,
    };
    let todos = run_blocking(state.store, move |service| service.list_todos(&params)).await?;
    Ok(Json(todos))
}

async fn list_by_priority_and_status(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<Vec<TodoSummary>>> {
    let summaries = run_blocking(state.store, move |service| {
        service.list_by_priority_and_status(query.priority.as_deref(), query.status.as_deref())
    })
    .await?;
    Ok(Json(summaries))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
) -> ApiResult<Json<Todo>> {
    let todo = run_blocking(state.store, move |service| service.get_todo(id)).await?;
    Ok(Json(todo))
}

async fn agenda(
    State(state): State<AppState>,
    Query(query): Query<AgendaQuery>,
) -> ApiResult<Json<Vec<Todo>>> {
    let todos = run_blocking(state.store, move |service| {
        service.agenda(query.date.as_deref())
    })
    .await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(payload): Json<NewTodo>,
) -> ApiResult<&'static str> {
    let id = run_blocking(state.store, move |service| service.create_todo(&payload)).await?;
    info!("event=todo_create module=api status=ok id={id}");
    Ok(CREATED_MESSAGE)
}

/// An absent body is an empty patch; a present one must be valid JSON.
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
    body: Bytes,
) -> ApiResult<String> {
    let patch = if body.is_empty() {
        TodoPatch::default()
    } else {
        Json::<TodoPatch>::from_bytes(&body)?.0
    };
    let labels = run_blocking(state.store, move |service| service.update_todo(id, &patch)).await?;
    Ok(labels)
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
) -> ApiResult<&'static str> {
    run_blocking(state.store, move |service| service.delete_todo(id)).await?;
    Ok(DELETED_MESSAGE)
}

/// Runs one store call on the blocking pool.
async fn run_blocking<T, F>(store: Arc<TodoStore>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&TodoService<SqliteTodoRepository<'_>>) -> RepoResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || store.with_service(f)).await?;
    Ok(result?)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();

    if status.is_server_error() {
        warn!(
            "event=http_request module=api status=error method={method} path={path} code={} elapsed_ms={elapsed_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=api status=ok method={method} path={path} code={} elapsed_ms={elapsed_ms}",
            status.as_u16()
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::router;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use todo_core::TodoStore;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(TodoStore::open_in_memory().unwrap()))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = send(app, Method::GET, uri, None).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    fn todos_named(list: &Value) -> Vec<String> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|item| item["todo"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn listing_returns_seeded_rows_with_and_without_trailing_slash() {
        let app = app();

        let (status, slash) = get_json(&app, "/todos/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            todos_named(&slash),
            vec!["Watch Movie", "Complete Homework", "Exercise"]
        );

        let (status, bare) = get_json(&app, "/todos").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bare, slash);
    }

    #[tokio::test]
    async fn listing_combines_filters_with_and() {
        let app = app();

        let (status, list) = get_json(&app, "/todos/?status=TO%20DO&category=WORK").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(todos_named(&list), vec!["Watch Movie"]);

        let (_, list) = get_json(&app, "/todos/?status=TO%20DO&category=HOME").await;
        assert!(list.as_array().unwrap().is_empty());

        let (_, list) = get_json(&app, "/todos/?search_q=Home").await;
        assert_eq!(todos_named(&list), vec!["Complete Homework"]);
    }

    #[tokio::test]
    async fn listing_rejects_invalid_filter_values() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/todos/?status=INVALID_VALUE", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid Todo Status");

        let (status, body) =
            send(&app, Method::GET, "/todos/?priority=LOW&category=GARDEN", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid Todo Category");
    }

    #[tokio::test]
    async fn formatted_todo_has_wire_shape() {
        let app = app();

        let (status, todo) = get_json(&app, "/todos/3/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            todo,
            json!({
                "id": 3,
                "todo": "Exercise",
                "priority": "MEDIUM",
                "status": "DONE",
                "category": "LEARNING",
                "dueDate": "2021-08-13"
            })
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/todos/999/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Todo Not Found");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/todos/999",
            Some(json!({ "status": "DONE" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Todo Not Found");
    }

    #[tokio::test]
    async fn summary_listing_defaults_to_high_priority() {
        let app = app();

        let (status, list) = get_json(&app, "/todos/status/priority").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            list,
            json!([{
                "id": 2,
                "todo": "Complete Homework",
                "priority": "HIGH",
                "status": "IN PROGRESS"
            }])
        );

        let (_, list) = get_json(&app, "/todos/status/priority/?priority=LOW&status=TO").await;
        assert_eq!(todos_named(&list), vec!["Watch Movie"]);
    }

    #[tokio::test]
    async fn agenda_normalizes_date_and_requires_it() {
        let app = app();

        let (status, list) = get_json(&app, "/agenda/?date=2021-8-13").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(todos_named(&list), vec!["Exercise"]);

        let (status, body) = send(&app, Method::GET, "/agenda", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid Due Date");

        let (status, body) = send(&app, Method::GET, "/agenda/?date=tomorrow", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid Due Date");
    }

    #[tokio::test]
    async fn create_with_invalid_priority_inserts_nothing() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/todos/",
            Some(json!({
                "todo": "Ship release",
                "priority": "URGENT",
                "status": "TO DO",
                "category": "WORK",
                "dueDate": "2021-10-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid Todo Priority");

        let (_, list) = get_json(&app, "/todos/").await;
        assert_eq!(list.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn create_requires_every_field() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/todos",
            Some(json!({
                "priority": "LOW",
                "status": "DONE",
                "category": "HOME",
                "dueDate": "2021-10-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Missing Todo Field: todo");
    }

    #[tokio::test]
    async fn create_with_colliding_id_is_internal_error() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/todos/",
            Some(json!({
                "id": 1,
                "todo": "Duplicate",
                "priority": "LOW",
                "status": "DONE",
                "category": "HOME",
                "dueDate": "2021-10-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
    }

    #[tokio::test]
    async fn update_status_only_keeps_other_fields() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::PUT,
            "/todos/1/",
            Some(json!({ "status": "DONE" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Status Updated");

        let (_, todo) = get_json(&app, "/todos/1/").await;
        assert_eq!(
            todo,
            json!({
                "id": 1,
                "todo": "Watch Movie",
                "priority": "LOW",
                "status": "DONE",
                "category": "WORK",
                "dueDate": "2021-09-22"
            })
        );
    }

    #[tokio::test]
    async fn update_rejects_invalid_field_before_lookup() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::PUT,
            "/todos/999/",
            Some(json!({ "dueDate": "not a date" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid Due Date");
    }

    #[tokio::test]
    async fn update_without_body_changes_nothing() {
        let app = app();

        let (status, body) = send(&app, Method::PUT, "/todos/1/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "");

        let (_, todo) = get_json(&app, "/todos/1/").await;
        assert_eq!(todo["status"], "TO DO");
    }

    #[tokio::test]
    async fn update_with_malformed_body_is_rejected() {
        let app = app();

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/todos/1/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"status\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn summary_listing_accepts_underscore_status() {
        let app = app();

        let (status, list) =
            get_json(&app, "/todos/status/priority/?priority=LOW&status=TO_DO").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(todos_named(&list), vec!["Watch Movie"]);
    }

    #[tokio::test]
    async fn deleting_missing_id_still_succeeds() {
        let app = app();

        let (status, body) = send(&app, Method::DELETE, "/todos/4242/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Todo Deleted");
    }

    #[tokio::test]
    async fn malformed_path_id_is_rejected() {
        let app = app();

        let (status, _) = send(&app, Method::GET, "/todos/abc/", None).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn create_read_update_delete_round_trip() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/todos/",
            Some(json!({
                "id": 10,
                "todo": "Learn axum",
                "priority": "HIGH",
                "status": "TO DO",
                "category": "LEARNING",
                "dueDate": "2021-9-22"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Todo Successfully Added");

        let (status, todo) = get_json(&app, "/todos/10/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(todo["todo"], "Learn axum");
        assert_eq!(todo["dueDate"], "2021-09-22");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/todos/10/",
            Some(json!({
                "todo": "Learn tower",
                "priority": "LOW",
                "status": "IN PROGRESS",
                "category": "WORK",
                "dueDate": "2022-01-15"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "Status Updated, Priority Updated, Todo Updated, Category Updated, Due Date Updated"
        );

        let (_, todo) = get_json(&app, "/todos/10").await;
        assert_eq!(todo["todo"], "Learn tower");
        assert_eq!(todo["status"], "IN PROGRESS");
        assert_eq!(todo["dueDate"], "2022-01-15");

        let (status, body) = send(&app, Method::DELETE, "/todos/10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Todo Deleted");

        let (status, body) = send(&app, Method::GET, "/todos/10/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Todo Not Found");
    }
}
