//! Carga de documentos PDF: valida la ruta, extrae el texto con `pdf-extract`
//! y adjunta los metadatos de origen.

use std::path::Path;

use chrono::Utc;
use mime_guess::MimeGuess;
use tracing::info;

use crate::error::{RagError, Result};
use crate::models::{Document, DocumentMetadata};

/// Carga un PDF del sistema de archivos y devuelve el documento con su texto
/// completo y metadatos de origen.
///
/// Errores: `FileNotFound` si la ruta no existe, `InvalidFormat` si la
/// extensión no es `.pdf`, `Load` si el parser de PDF falla.
pub fn load_document(file_path: &Path) -> Result<Document> {
    if !file_path.exists() {
        return Err(RagError::FileNotFound(file_path.to_path_buf()));
    }

    let extension = file_path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");
    if !extension.eq_ignore_ascii_case("pdf") {
        return Err(RagError::InvalidFormat(file_path.to_path_buf()));
    }

    let text = pdf_extract::extract_text(file_path).map_err(|e| RagError::Load {
        path: file_path.to_path_buf(),
        message: e.to_string(),
    })?;

    let path_str = file_path.to_string_lossy().to_string();
    let filename = file_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.clone());
    let mime: MimeGuess = MimeGuess::from_path(file_path);

    info!("PDF cargado: {} ({} caracteres)", file_path.display(), text.chars().count());

    Ok(Document {
        text,
        metadata: DocumentMetadata {
            source: filename,
            file_path: path_str,
            file_type: "pdf".to_string(),
            loader: "pdf-extract".to_string(),
            mime_type: mime.first().map(|m| m.to_string()),
            loaded_at: Utc::now().to_rfc3339(),
        },
    })
}
