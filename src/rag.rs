//! Pipeline de consulta RAG.
//!
//! Flujo:
//!   1. Embedding de la pregunta con el mismo modelo usado en la ingesta.
//!   2. Búsqueda por similitud de los `k` chunks más cercanos en la colección.
//!   3. Concatenación de los textos recuperados en un único contexto.
//!   4. Prompt fijo (contexto + pregunta) contra el generador.
//!   5. Respuesta más la lista de textos de contexto en crudo.
//!
//! Este pipeline nunca propaga errores: cualquier fallo interno se convierte
//! en una respuesta normal cuyo campo `response` lleva el mensaje de error y
//! cuyo contexto queda vacío. El llamante debe inspeccionar el mensaje.

use tracing::{debug, error};

use crate::error::Result;
use crate::llm::{build_prompt, Embedder, Generator};
use crate::models::QueryResponse;
use crate::vector_store::VectorStore;

pub async fn process_query(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    generator: &dyn Generator,
    query: &str,
    collection_name: &str,
    k: u64,
) -> QueryResponse {
    match run_query(store, embedder, generator, query, collection_name, k).await {
        Ok(response) => response,
        Err(e) => {
            error!("Error procesando la consulta RAG: {e}");
            QueryResponse {
                response: format!("Error processing query: {e}"),
                context: Vec::new(),
            }
        }
    }
}

async fn run_query(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    generator: &dyn Generator,
    query: &str,
    collection_name: &str,
    k: u64,
) -> Result<QueryResponse> {
    // 1) Embedding de la pregunta
    let query_vec = embedder.embed(query).await?;

    // 2) Top-k por similitud de coseno (puede haber menos de k resultados)
    let results = store.search(collection_name, &query_vec, k).await?;
    for hit in &results {
        debug!("chunk {} recuperado (score {:.4})", hit.id, hit.score);
    }
    let context_texts: Vec<String> = results.into_iter().map(|r| r.text).collect();

    // 3) Contexto concatenado en orden de relevancia
    let context = format_context(&context_texts);

    // 4) Prompt fijo + generación
    let prompt = build_prompt(&context, query);
    let response = generator.generate(&prompt).await?;

    // 5) Respuesta con el contexto en crudo para inspección del llamante
    Ok(QueryResponse { response, context: context_texts })
}

/// Une los textos recuperados, en orden de ranking, separados por una línea
/// en blanco.
pub fn format_context(texts: &[String]) -> String {
    texts.join("\n\n")
}
