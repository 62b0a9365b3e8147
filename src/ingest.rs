//! Pipeline de ingesta: carga un PDF, lo trocea en chunks solapados, calcula
//! sus embeddings y los inserta en una colección de Qdrant.

use std::path::Path;

use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::llm::Embedder;
use crate::loader;
use crate::models::Document;
use crate::splitter::DocumentSplitter;
use crate::vector_store::VectorStore;

/// Resumen de los resultados de una operación de ingesta.
#[derive(Debug, Default)]
pub struct IngestionSummary {
    pub chunks_created: usize,
    pub collection_created: bool,
}

/// Implementa cómo se mostrará el resumen como texto.
impl std::fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Resumen: {} chunks ingeridos en una colección {}.",
            self.chunks_created,
            if self.collection_created { "nueva" } else { "existente" }
        )
    }
}

/// Ingesta un fichero PDF en la colección indicada.
///
/// Pasos, en orden estricto: validar y cargar el PDF, trocear, asegurar la
/// colección (creación idempotente), embeber e insertar cada chunk. Cualquier
/// fallo corta el pipeline y se propaga; no hay rollback de los chunks ya
/// insertados.
pub async fn upload_file(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    cfg: &AppConfig,
    file_path: &Path,
    collection_name: &str,
) -> Result<IngestionSummary> {
    let document = loader::load_document(file_path)?;
    ingest_document(store, embedder, cfg, &document, collection_name).await
}

async fn ingest_document(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    cfg: &AppConfig,
    document: &Document,
    collection_name: &str,
) -> Result<IngestionSummary> {
    let splitter = DocumentSplitter::new(cfg.chunk_size, cfg.chunk_overlap)?;
    let mut chunks = splitter.split_document(document)?;

    // La dimensión de la colección queda fijada por el modelo de embeddings.
    let collection_created = store
        .create_collection(collection_name, embedder.dimensions())
        .await?;

    // --- Fase 1: Embeddings ---
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    for (chunk, vector) in chunks.iter_mut().zip(vectors) {
        chunk.embedding = vector;
    }

    // --- Fase 2: Persistencia (un upsert por chunk) ---
    store.add_chunks(collection_name, &chunks).await?;

    let summary = IngestionSummary {
        chunks_created: chunks.len(),
        collection_created,
    };
    info!(
        "Ingerido {} en '{collection_name}': {summary}",
        document.metadata.source
    );
    Ok(summary)
}
