// Módulos de la aplicación
mod api;
mod app_state;
mod config;
mod error;
mod ingest;
mod llm;
mod loader;
mod models;
mod rag;
mod splitter;
mod vector_store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::vector_store::QdrantStore;

#[tokio::main]
async fn main() {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env().expect("Error al cargar la configuración");

    // 3. Conectar a Qdrant
    let store = QdrantStore::connect_from_config(&cfg)
        .await
        .expect("Error conectando a Qdrant");

    // 4. Inicializar gestor de LLMs (embeddings + generación)
    let llm_manager = llm::LlmManager::from_config(&cfg).expect("Error inicializando LLM Manager");

    // 5. Crear estado compartido de la aplicación
    let app_state = AppState {
        config: cfg.clone(),
        store: Arc::new(store),
        llm: Arc::new(llm_manager),
    };

    // 6. Configurar el router de la API
    let app = Router::new()
        .merge(api::create_router(app_state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 7. Iniciar el servidor
    let server_addr = &app_state.config.server_addr;
    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .unwrap();
    info!("🚀 Servidor escuchando en http://{}", server_addr);

    axum::serve(listener, app).await.unwrap();
}
