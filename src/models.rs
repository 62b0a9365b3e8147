//! Modelos de dominio (documentos cargados, chunks y respuestas RAG).

use serde::{Deserialize, Serialize};

/// Metadatos de origen que acompañan a un documento y se heredan en sus chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Nombre del fichero (sin ruta).
    pub source: String,
    pub file_path: String,
    pub file_type: String,
    pub loader: String,
    pub mime_type: Option<String>,
    pub loaded_at: String,
}

/// Documento con el texto completo extraído del PDF.
/// Vive sólo durante la ingesta: se descarta tras el troceado.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Metadatos de un chunk: los del documento padre más su posición en la
/// secuencia de troceado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(flatten)]
    pub document: DocumentMetadata,
    /// Índice de secuencia dentro del documento.
    pub chunk_id: usize,
    pub total_chunks: usize,
    pub splitter: String,
    /// Longitud en bytes del texto del chunk.
    pub chunk_size: usize,
}

/// Trozo de texto acotado de un documento. El embedding queda vacío hasta
/// que el pipeline de ingesta lo calcula; después el chunk no se muta.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// Resultado de una búsqueda por similitud: texto recuperado con su score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub id: String,
    pub score: f32,
    pub text: String,
}

/// Respuesta del pipeline de consulta. Si algo falla internamente,
/// `response` contiene el mensaje de error y `context` queda vacío.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub context: Vec<String>,
}
