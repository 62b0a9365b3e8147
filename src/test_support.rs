//! Dobles de prueba compartidos: vector store en memoria con similitud de
//! coseno, embedder determinista y generadores enlatados.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RagError, Result};
use crate::llm::{Embedder, Generator};
use crate::models::{Chunk, ChunkMetadata, DocumentMetadata, ScoredChunk};
use crate::vector_store::VectorStore;

/// Construye un chunk de prueba con metadatos fijos y el embedding dado.
pub fn make_chunk(id: &str, text: &str, embedding: Vec<f32>) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        embedding,
        metadata: ChunkMetadata {
            document: DocumentMetadata {
                source: "prueba.pdf".to_string(),
                file_path: "/tmp/prueba.pdf".to_string(),
                file_type: "pdf".to_string(),
                loader: "pdf-extract".to_string(),
                mime_type: Some("application/pdf".to_string()),
                loaded_at: "2024-01-01T00:00:00Z".to_string(),
            },
            chunk_id: 0,
            total_chunks: 1,
            splitter: "RecursiveCharacterSplitter".to_string(),
            chunk_size: text.len(),
        },
    }
}

struct MemoryCollection {
    dimensions: u64,
    chunks: HashMap<String, (Vec<f32>, String)>,
}

/// Vector store en memoria con el mismo contrato que el adaptador de Qdrant:
/// creación idempotente, upserts que validan la dimensión y búsqueda por
/// coseno ordenada de mayor a menor.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryStore {
    pub async fn chunk_count(&self, name: &str) -> usize {
        self.collections
            .read()
            .await
            .get(name)
            .map(|c| c.chunks.len())
            .unwrap_or(0)
    }

    pub async fn dimensions_of(&self, name: &str) -> Option<u64> {
        self.collections.read().await.get(name).map(|c| c.dimensions)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn create_collection(&self, name: &str, dimensions: u64) -> Result<bool> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Ok(false);
        }
        collections.insert(
            name.to_string(),
            MemoryCollection { dimensions, chunks: HashMap::new() },
        );
        Ok(true)
    }

    async fn add_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| RagError::Store(format!("la colección '{collection}' no existe")))?;
        for chunk in chunks {
            if chunk.embedding.len() as u64 != store.dimensions {
                return Err(RagError::Store(format!(
                    "dimensión del vector ({}) distinta a la de la colección ({})",
                    chunk.embedding.len(),
                    store.dimensions
                )));
            }
            store
                .chunks
                .insert(chunk.id.clone(), (chunk.embedding.clone(), chunk.text.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: u64,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().await;
        let store = collections
            .get(collection)
            .ok_or_else(|| RagError::Store(format!("la colección '{collection}' no existe")))?;

        let mut scored: Vec<ScoredChunk> = store
            .chunks
            .iter()
            .map(|(id, (vector, text))| ScoredChunk {
                id: id.clone(),
                score: cosine_similarity(vector, embedding),
                text: text.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k as usize);
        Ok(scored)
    }
}

/// Embedder determinista: acumula los bytes del texto sobre un vector de
/// dimensión fija. El mismo texto produce siempre el mismo vector.
pub struct MockEmbedder {
    dimensions: u64,
}

impl MockEmbedder {
    pub fn new(dimensions: u64) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions as usize];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions as usize] += byte as f32;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> u64 {
        self.dimensions
    }
}

/// Generador que devuelve una respuesta fija y recuerda el último prompt.
pub struct MockGenerator {
    reply: String,
    last_prompt: Mutex<Option<String>>,
}

impl MockGenerator {
    pub fn new(reply: &str) -> Self {
        Self { reply: reply.to_string(), last_prompt: Mutex::new(None) }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Generador que falla siempre, para probar la política de errores.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(RagError::Generation("el modelo no responde".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn el_embedder_es_determinista() {
        let embedder = MockEmbedder::new(16);
        let a = embedder.embed("el mismo texto").await.unwrap();
        let b = embedder.embed("el mismo texto").await.unwrap();
        let c = embedder.embed("otro texto").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[tokio::test]
    async fn la_busqueda_ordena_por_score_descendente() {
        let store = MemoryStore::default();
        let embedder = MockEmbedder::new(8);
        store.create_collection("docs", 8).await.unwrap();

        for texto in ["alfa beta", "gamma delta", "alfa beta gamma"] {
            let vector = embedder.embed(texto).await.unwrap();
            store.add_chunks("docs", &[make_chunk(texto, texto, vector)]).await.unwrap();
        }

        let consulta = embedder.embed("alfa beta").await.unwrap();
        let resultados = store.search("docs", &consulta, 10).await.unwrap();

        assert_eq!(resultados.len(), 3);
        for par in resultados.windows(2) {
            assert!(par[0].score >= par[1].score);
        }
        assert_eq!(resultados[0].text, "alfa beta");
    }

    #[tokio::test]
    async fn la_busqueda_no_mezcla_colecciones() {
        let store = MemoryStore::default();
        let embedder = MockEmbedder::new(8);
        store.create_collection("a", 8).await.unwrap();
        store.create_collection("b", 8).await.unwrap();

        let vector = embedder.embed("sólo en a").await.unwrap();
        store.add_chunks("a", &[make_chunk("c1", "sólo en a", vector.clone())]).await.unwrap();

        let resultados = store.search("b", &vector, 10).await.unwrap();
        assert!(resultados.is_empty());
    }
}
