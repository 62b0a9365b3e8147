//! Carga y gestión de configuración de la aplicación (Qdrant + LLM + chunking).

use std::env;
use anyhow::{anyhow, Result};
use url::Url;

#[derive(Clone, Debug)]
pub enum LlmProvider {
    OpenAI,
    Gemini,
    Ollama,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!("Proveedor LLM no soportado: {other}")),
        }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub server_addr: String,

    pub llm_provider: LlmProvider,
    pub llm_embedding_model: String,
    pub llm_chat_model: String,
    pub llm_temperature: f64,

    /// Dimensión de los embeddings; debe coincidir con la dimensión de las
    /// colecciones en Qdrant o los upserts fallarán.
    pub embedding_dim: u64,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let qdrant_url = env::var("QDRANT_URL")
            .map_err(|_| anyhow!("Falta QDRANT_URL en el entorno"))?;
        Url::parse(&qdrant_url)
            .map_err(|e| anyhow!("QDRANT_URL no es una URL válida: {e}"))?;
        let qdrant_api_key = env::var("QDRANT_API_KEY").ok().filter(|k| !k.is_empty());

        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());

        let llm_provider_str =
            env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let llm_provider = LlmProvider::from_str(&llm_provider_str)?;

        let llm_embedding_model = env::var("LLM_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-large".to_string());
        let llm_chat_model =
            env::var("LLM_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let llm_temperature = parse_var("LLM_TEMPERATURE", 0.3)?;

        let embedding_dim = parse_var("EMBEDDING_DIM", 1024)?;
        let chunk_size = parse_var("CHUNK_SIZE", 500)?;
        let chunk_overlap = parse_var("CHUNK_OVERLAP", 50)?;

        Ok(Self {
            qdrant_url,
            qdrant_api_key,
            server_addr,
            llm_provider,
            llm_embedding_model,
            llm_chat_model,
            llm_temperature,
            embedding_dim,
            chunk_size,
            chunk_overlap,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Valor inválido para {name}: {e}")),
        Err(_) => Ok(default),
    }
}
