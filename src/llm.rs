//! Abstracción sobre Rig para trabajar con distintos proveedores de LLM.
//! De momento se implementa OpenAI; Gemini/Ollama quedan preparados para el futuro.

use async_trait::async_trait;
use rig::completion::Prompt;
use rig::embeddings::EmbeddingModel; // <- para .embed_texts

use crate::config::{AppConfig, LlmProvider};
use crate::error::{RagError, Result};

/// Proveedor de embeddings: texto → vector de dimensión fija.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Versión por lotes; por defecto llama a `embed` secuencialmente.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Dimensión de los vectores producidos.
    fn dimensions(&self) -> u64;
}

/// Generador de texto: prompt relleno → respuesta.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Plantilla fija del prompt de respuesta, con el contexto recuperado
/// y la pregunta del usuario.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Context:\n{context}\n\n\
         Based on the context, answer the following query:\n\
         Query: {query}\n\n\
         Answer:"
    )
}

/// Gestor de LLMs y embeddings.
#[derive(Debug, Clone)]
pub struct LlmManager {
    pub provider: LlmProvider,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f64,
    pub embedding_dim: u64,
}

impl LlmManager {
    /// Construye el manager a partir de la configuración.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            provider: cfg.llm_provider.clone(),
            embedding_model: cfg.llm_embedding_model.clone(),
            chat_model: cfg.llm_chat_model.clone(),
            temperature: cfg.llm_temperature,
            embedding_dim: cfg.embedding_dim,
        })
    }

    // ---------------------------------------------------------------------
    // EMBEDDINGS
    // ---------------------------------------------------------------------

    /// Calcula embeddings para una lista de textos.
    ///
    /// Nota: sólo implementado para OpenAI. Para otros proveedores
    /// se podrían añadir ramas adicionales al `match`.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self.provider {
            LlmProvider::OpenAI => self.embed_with_openai(texts).await,
            ref other => Err(RagError::Embedding(format!(
                "Proveedor LLM {other:?} aún no implementado para embeddings"
            ))),
        }
    }

    async fn embed_with_openai(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        use rig::providers::openai::{self, TEXT_EMBEDDING_3_LARGE};
        // Trait para client.embedding_model_with_ndims(...)
        use rig::client::EmbeddingsClient as _;

        // Cliente OpenAI de Rig
        let client = openai::Client::from_env();

        // Modelo de embeddings: config o default, con la dimensión fijada
        // para que coincida con las colecciones de Qdrant.
        let model_name = if self.embedding_model.is_empty() {
            TEXT_EMBEDDING_3_LARGE
        } else {
            self.embedding_model.as_str()
        };

        let embedding_model =
            client.embedding_model_with_ndims(model_name, self.embedding_dim as usize);

        let embeddings = embedding_model
            .embed_texts(texts.to_vec())
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "Número de embeddings ({}) distinto al número de textos ({})",
                embeddings.len(),
                texts.len()
            )));
        }

        Ok(embeddings
            .iter()
            .map(|emb| emb.vec.iter().map(|v| *v as f32).collect())
            .collect())
    }

    // ---------------------------------------------------------------------
    // CHAT / COMPLETION
    // ---------------------------------------------------------------------

    async fn generate_with_openai(&self, prompt: &str) -> Result<String> {
        use rig::providers::openai;
        // Trait para client.agent(...)
        use rig::client::CompletionClient as _;

        let client = openai::Client::from_env();

        // Modelo de chat por defecto si no se ha configurado otro
        let model_name = if self.chat_model.is_empty() {
            "gpt-4o-mini"
        } else {
            self.chat_model.as_str()
        };

        let agent = client
            .agent(model_name)
            .temperature(self.temperature)
            .build();

        let answer = agent
            .prompt(prompt)
            .await
            .map_err(|e| RagError::Generation(e.to_string()))?;
        Ok(answer)
    }
}

#[async_trait]
impl Embedder for LlmManager {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_texts(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("No se pudo generar el embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_texts(texts).await
    }

    fn dimensions(&self) -> u64 {
        self.embedding_dim
    }
}

#[async_trait]
impl Generator for LlmManager {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.provider {
            LlmProvider::OpenAI => self.generate_with_openai(prompt).await,
            ref other => Err(RagError::Generation(format!(
                "Proveedor LLM {other:?} aún no implementado para chat"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_plantilla_del_prompt_es_exacta() {
        let prompt = build_prompt("un contexto", "una pregunta");
        assert_eq!(
            prompt,
            "Context:\nun contexto\n\n\
             Based on the context, answer the following query:\n\
             Query: una pregunta\n\n\
             Answer:"
        );
    }
}
