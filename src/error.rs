//! Tipo de error estructurado compartido por los dos pipelines (ingesta y
//! consulta). Cada variante identifica la fase que falló; el mensaje conserva
//! la causa original.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("File {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("File {0} is not a PDF")]
    InvalidFormat(PathBuf),

    #[error("Error cargando {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Failed to split documents: {0}")]
    Split(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Error generating response: {0}")]
    Generation(String),
}
