use std::path::Path;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{app_state::AppState, ingest, models::QueryResponse, rag};

// --- Payloads de la API ---

#[derive(Deserialize)]
pub struct UploadFileRequest {
    file_path: String,
    collection_name: String,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    query: String,
    collection_name: String,
    #[serde(default = "default_k")]
    k: u64,
}

fn default_k() -> u64 {
    5
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/v1/rag/upload", post(upload_handler))
        .route("/api/v1/rag/query", post(query_handler))
        .route("/api/v1/health", get(health_handler))
        .with_state(app_state)
}

// --- Handlers ---

/// Los errores de ingesta se propagan hasta aquí y se convierten en un 400
/// con el detalle; es la capa de frontera la que decide el código de estado.
#[axum::debug_handler]
async fn upload_handler(
    State(state): State<AppState>,
    Json(payload): Json<UploadFileRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let result = ingest::upload_file(
        state.store.as_ref(),
        state.llm.as_ref(),
        &state.config,
        Path::new(&payload.file_path),
        &payload.collection_name,
    )
    .await;

    match result {
        Ok(summary) => Ok((StatusCode::OK, Json(json!({ "message": summary.to_string() })))),
        Err(e) => {
            error!("Error en la ingesta de {}: {e}", payload.file_path);
            Err((StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))
        }
    }
}

/// El pipeline de consulta nunca lanza: los fallos internos viajan dentro
/// del cuerpo de la respuesta (campo `response`), siempre con un 200.
#[axum::debug_handler]
async fn query_handler(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let response = rag::process_query(
        state.store.as_ref(),
        state.llm.as_ref(),
        state.llm.as_ref(),
        &payload.query,
        &payload.collection_name,
        payload.k,
    )
    .await;

    Json(response)
}

#[axum::debug_handler]
async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match state.store.health_check().await {
        Ok(()) => Ok(Json(json!({ "status": "ok" }))),
        Err(e) => {
            error!("Error en el health check de Qdrant: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
