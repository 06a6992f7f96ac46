//! HTTP routes under `/api`.

use crate::config::{MAX_BODY_BYTES, ServerConfig};
use crate::store::{MemoryStore, Page, ShapeObject};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Path, Request, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub type AppState = Arc<MemoryStore>;

/// Failures reported to clients as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Page not found")]
    PageNotFound,
    #[error("Shape not found")]
    ShapeNotFound,
    #[error("Shape must include an id")]
    MissingShapeId,
    #[error("Not found")]
    NoRoute,
    #[error("{0}")]
    BadBody(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::PageNotFound | ApiError::ShapeNotFound | ApiError::NoRoute => {
                StatusCode::NOT_FOUND
            }
            ApiError::MissingShapeId | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}


impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// A JSON object request body.
///
/// An empty body, a non-JSON content type or a JSON value that is not an
/// object all read as `{}`. Malformed JSON is rejected.
struct ObjectBody(ShapeObject);

impl<S: Send + Sync> FromRequest<S> for ObjectBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadBody(rejection.body_text()))?;
        if !is_json || bytes.is_empty() {
            return Ok(ObjectBody(ShapeObject::new()));
        }
        match serde_json::from_slice(&bytes) {
            Ok(Value::Object(map)) => Ok(ObjectBody(map)),
            Ok(_) => Ok(ObjectBody(ShapeObject::new())),
            Err(e) => Err(ApiError::BadBody(format!("Invalid JSON body: {e}"))),
        }
    }
}

fn is_json_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
}

/// Build the application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/pages", get(list_pages).post(create_page))
        .route("/api/pages/{id}", delete(delete_page))
        .route(
            "/api/pages/{page_id}/shapes",
            get(list_shapes).post(create_shape),
        )
        .route(
            "/api/pages/{page_id}/shapes/{shape_id}",
            put(update_shape).delete(delete_shape),
        )
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let config = config.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|o| config.origin_allowed(o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn fallback() -> ApiError {
    ApiError::NoRoute
}

async fn list_pages(State(store): State<AppState>) -> Json<Vec<Page>> {
    Json(store.list_pages())
}

#[derive(Debug, Default, Deserialize)]
struct NewPage {
    #[serde(default)]
    name: Option<Value>,
}

async fn create_page(
    State(store): State<AppState>,
    body: Result<Json<NewPage>, JsonRejection>,
) -> Json<Page> {
    // Anything but a non-blank string name gets the default.
    let name = body
        .ok()
        .and_then(|Json(b)| b.name)
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty());
    let page = store.create_page(name);
    info!("Created page {} ({})", page.id, page.name);
    Json(page)
}

async fn delete_page(State(store): State<AppState>, Path(id): Path<String>) -> StatusCode {
    store.delete_page(&id);
    info!("Deleted page {}", id);
    StatusCode::NO_CONTENT
}

fn require_page(store: &MemoryStore, page_id: &str) -> ApiResult<()> {
    if store.page_exists(page_id) {
        Ok(())
    } else {
        debug!("Unknown page {}", page_id);
        Err(ApiError::PageNotFound)
    }
}

async fn list_shapes(
    State(store): State<AppState>,
    Path(page_id): Path<String>,
) -> ApiResult<Json<Vec<ShapeObject>>> {
    require_page(&store, &page_id)?;
    Ok(Json(store.list_shapes(&page_id)))
}

async fn create_shape(
    State(store): State<AppState>,
    Path(page_id): Path<String>,
    ObjectBody(mut shape): ObjectBody,
) -> ApiResult<Json<ShapeObject>> {
    require_page(&store, &page_id)?;
    if !shape.get("id").is_some_and(Value::is_string) {
        warn!("Rejected shape without id on page {}", page_id);
        return Err(ApiError::MissingShapeId);
    }
    shape.insert("pageId".into(), Value::String(page_id.clone()));
    Ok(Json(store.add_shape(&page_id, shape)))
}

#[derive(Debug, Deserialize)]
struct ShapePath {
    page_id: String,
    shape_id: String,
}

async fn update_shape(
    State(store): State<AppState>,
    Path(path): Path<ShapePath>,
    ObjectBody(patch): ObjectBody,
) -> ApiResult<Json<ShapeObject>> {
    require_page(&store, &path.page_id)?;
    store
        .update_shape(&path.page_id, &path.shape_id, patch)
        .map(Json)
        .ok_or(ApiError::ShapeNotFound)
}

async fn delete_shape(
    State(store): State<AppState>,
    Path(path): Path<ShapePath>,
) -> ApiResult<StatusCode> {
    require_page(&store, &path.page_id)?;
    store.remove_shape(&path.page_id, &path.shape_id);
    Ok(StatusCode::NO_CONTENT)
}
