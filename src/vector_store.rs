//! Vector store sobre Qdrant: colecciones con nombre que guardan pares
//! (vector, payload) y se consultan por similitud de coseno.
//!
//! La interfaz `VectorStore` es el único contrato que ven los pipelines;
//! `QdrantStore` es el único adaptador de producción.

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{RagError, Result};
use crate::models::{Chunk, ScoredChunk};

/// Contrato mínimo del vector store: existencia y creación idempotente de
/// colecciones, inserción de chunks y búsqueda por similitud. Sin borrado ni
/// actualización, y sin garantías transaccionales entre upserts.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Crea la colección si no existe. Devuelve `true` si se creó,
    /// `false` si ya existía (no es un error).
    async fn create_collection(&self, name: &str, dimensions: u64) -> Result<bool>;

    /// Inserta los chunks (con embedding ya calculado) en la colección,
    /// un upsert por chunk.
    async fn add_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Devuelve los `k` chunks más cercanos al vector, ordenados por score
    /// descendente. Puede devolver menos de `k` si la colección es pequeña.
    async fn search(&self, collection: &str, embedding: &[f32], k: u64)
        -> Result<Vec<ScoredChunk>>;
}

/// Adaptador de producción sobre el cliente gRPC de Qdrant.
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Conecta con Qdrant usando la URL y la credencial de la configuración,
    /// y comprueba que el servidor responde.
    pub async fn connect_from_config(cfg: &AppConfig) -> Result<Self> {
        info!("Conectando a Qdrant en {}...", cfg.qdrant_url);

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(map_err)?;

        client.health_check().await.map_err(map_err)?;
        info!("Conexión a Qdrant OK");

        Ok(Self { client })
    }

    /// Comprobación de salud del servidor, para el endpoint de estado.
    pub async fn health_check(&self) -> Result<()> {
        self.client.health_check().await.map_err(map_err)?;
        Ok(())
    }
}

fn map_err(e: qdrant_client::QdrantError) -> RagError {
    RagError::Store(e.to_string())
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.client.collection_exists(name).await.map_err(map_err)
    }

    async fn create_collection(&self, name: &str, dimensions: u64) -> Result<bool> {
        if self.collection_exists(name).await? {
            debug!("La colección '{name}' ya existe.");
            return Ok(false);
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions, Distance::Cosine)),
            )
            .await
            .map_err(map_err)?;

        info!("Colección '{name}' creada (dim={dimensions}, distancia=coseno).");
        Ok(true)
    }

    async fn add_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            let payload_value = json!({
                "text": chunk.text,
                "metadata": chunk.metadata,
            });
            let payload = Payload::try_from(payload_value)
                .map_err(|e| RagError::Store(format!("payload inválido: {e}")))?;

            let point = PointStruct::new(chunk.id.clone(), chunk.embedding.clone(), payload);

            self.client
                .upsert_points(UpsertPointsBuilder::new(collection, vec![point]).wait(true))
                .await
                .map_err(map_err)?;
        }

        debug!("{} chunks insertados en '{collection}'.", chunks.len());
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: u64,
    ) -> Result<Vec<ScoredChunk>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), k).with_payload(true),
            )
            .await
            .map_err(map_err)?;

        Ok(response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .map(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => s.clone(),
                        Some(PointIdOptions::Num(n)) => n.to_string(),
                        None => String::new(),
                    })
                    .unwrap_or_default();

                let text = scored
                    .payload
                    .get("text")
                    .and_then(|v| match &v.kind {
                        Some(Kind::StringValue(s)) => Some(s.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();

                ScoredChunk { id, score: scored.score, text }
            })
            .collect())
    }
}
