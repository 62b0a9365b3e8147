//! Troceado recursivo de documentos en chunks solapados.
//!
//! Estrategia: intentar primero el separador más grande (párrafo), luego
//! línea, frase y palabra; si ningún separador basta, cortar por caracteres.
//! Los chunks consecutivos repiten hasta `chunk_overlap` caracteres finales
//! del anterior para conservar contexto entre fronteras.

use std::collections::VecDeque;

use uuid::Uuid;

use crate::error::{RagError, Result};
use crate::models::{Chunk, ChunkMetadata, Document};

const SPLITTER_NAME: &str = "RecursiveCharacterSplitter";

/// Jerarquía de separadores, del más grande al más pequeño. Si ninguno
/// aparece en el texto se corta por caracteres con solape exacto.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

#[derive(Debug, Clone)]
pub struct DocumentSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Split("chunk_size debe ser mayor que cero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Split(format!(
                "chunk_overlap ({chunk_overlap}) debe ser menor que chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Trocea el documento y devuelve los chunks con sus metadatos de
    /// secuencia y los metadatos del documento padre heredados.
    pub fn split_document(&self, document: &Document) -> Result<Vec<Chunk>> {
        let texts = self.split_text(&document.text);
        let total_chunks = texts.len();

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let chunk_size = text.len();
                Chunk {
                    id: Uuid::new_v4().to_string(),
                    text,
                    embedding: Vec::new(),
                    metadata: ChunkMetadata {
                        document: document.metadata.clone(),
                        chunk_id: i,
                        total_chunks,
                        splitter: SPLITTER_NAME.to_string(),
                        chunk_size,
                    },
                }
            })
            .collect())
    }

    /// Trocea texto plano. Un texto vacío (o sólo espacios) produce cero chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.len() <= self.chunk_size {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            return vec![trimmed.to_string()];
        }

        let Some((&separator, rest)) = separators.split_first() else {
            return self.split_by_chars(text);
        };
        if !text.contains(separator) {
            return self.split_recursive(text, rest);
        }

        let pieces = split_keeping_separator(text, separator);

        // Las piezas que aún exceden el límite bajan al siguiente separador.
        let mut splits = Vec::new();
        for piece in pieces {
            if piece.len() > self.chunk_size {
                splits.extend(self.split_recursive(piece, rest));
            } else {
                splits.push(piece.to_string());
            }
        }

        self.merge_splits(splits)
    }

    /// Fusiona piezas pequeñas en chunks de hasta `chunk_size`, arrastrando
    /// una ventana final de hasta `chunk_overlap` caracteres al chunk siguiente.
    fn merge_splits(&self, splits: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            if total + split.len() > self.chunk_size && !window.is_empty() {
                push_chunk(&mut chunks, &window);
                // Vaciar la ventana hasta que quepa el solape y la pieza nueva.
                while total > self.chunk_overlap
                    || (total + split.len() > self.chunk_size && total > 0)
                {
                    let first = window.pop_front().expect("ventana no vacía");
                    total -= first.len();
                }
            }
            total += split.len();
            window.push_back(split);
        }

        if !window.is_empty() {
            push_chunk(&mut chunks, &window);
        }

        chunks
    }

    /// Corte por caracteres con solape exacto, respetando fronteras UTF-8.
    fn split_by_chars(&self, text: &str) -> Vec<String> {
        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let n = boundaries.len();
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < n {
            let end = (start + self.chunk_size).min(n);
            let byte_start = boundaries[start];
            let byte_end = if end == n { text.len() } else { boundaries[end] };
            chunks.push(text[byte_start..byte_end].to_string());
            if end == n {
                break;
            }
            start += step;
        }
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<String>) {
    let joined: String = window.iter().map(String::as_str).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Corta en un separador dejando el separador pegado a la pieza anterior,
/// de modo que la concatenación de las piezas reconstruye el texto original.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}
