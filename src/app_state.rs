use std::sync::Arc;

use crate::{config::AppConfig, llm::LlmManager, vector_store::QdrantStore};

/// Estado compartido de la aplicación: se construye una única vez en el
/// arranque y se inyecta explícitamente en los handlers (sin estado global).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<QdrantStore>,
    pub llm: Arc<LlmManager>,
}
