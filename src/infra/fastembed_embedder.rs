use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use crate::app::ports::Embedder;
use crate::error::{PrepError, Result};

/// Local sentence embeddings through fastembed (ONNX runtime). The model is
/// downloaded into fastembed's cache on first use.
pub struct FastEmbedder {
    model: TextEmbedding,
}

impl FastEmbedder {
    pub fn new(model_name: &str) -> Result<Self> {
        let model_id = resolve_model(model_name)?;
        info!("Loading embedding model {}", model_name);
        let model = TextEmbedding::try_new(
            InitOptions::new(model_id).with_show_download_progress(true),
        )
        .map_err(|e| PrepError::Embedding(format!("failed to load {}: {}", model_name, e)))?;
        Ok(Self { model })
    }
}

/// Map a Hugging Face style model name onto a fastembed model
pub fn resolve_model(name: &str) -> Result<EmbeddingModel> {
    let short = name.trim().trim_start_matches("intfloat/").to_ascii_lowercase();
    match short.as_str() {
        "multilingual-e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-base" => Ok(EmbeddingModel::MultilingualE5Base),
        "multilingual-e5-large" => Ok(EmbeddingModel::MultilingualE5Large),
        _ => Err(PrepError::Config(format!(
            "unsupported embedding model '{}'",
            name
        ))),
    }
}

impl Embedder for FastEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .model
            .embed(vec![text], None)
            .map_err(|e| PrepError::Embedding(e.to_string()))?;
        vectors
            .pop()
            .ok_or_else(|| PrepError::Embedding("model returned no vector".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_models() {
        assert!(matches!(
            resolve_model("intfloat/multilingual-e5-base"),
            Ok(EmbeddingModel::MultilingualE5Base)
        ));
        assert!(matches!(
            resolve_model("multilingual-e5-small"),
            Ok(EmbeddingModel::MultilingualE5Small)
        ));
        assert!(matches!(
            resolve_model(" intfloat/Multilingual-E5-Large "),
            Ok(EmbeddingModel::MultilingualE5Large)
        ));
    }

    #[test]
    fn test_resolve_unknown_model() {
        assert!(matches!(
            resolve_model("text-embedding-3-small"),
            Err(PrepError::Config(_))
        ));
    }
}
