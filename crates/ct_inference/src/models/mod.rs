use std::sync::Arc;

use ct_core::{Error, InferenceModel, Result};

use crate::Config;

pub mod dummy;
pub mod ollama;

pub use dummy::DummyModel;
pub use ollama::OllamaModel;

/// Build an inference model from configuration. `ollama` talks to a local
/// Ollama daemon; `dummy` is deterministic and offline.
pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    match config.model_name.as_deref().unwrap_or("ollama") {
        "ollama" => Ok(Arc::new(OllamaModel::new(
            config.model_url,
            config.model_variant,
        ))),
        "dummy" => Ok(Arc::new(DummyModel)),
        other => Err(Error::Inference(format!(
            "Unknown inference model: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_model_by_name() {
        let config = Config {
            model_name: Some("dummy".to_string()),
            ..Config::default()
        };
        let model = create_model(Some(config)).await.unwrap();
        assert_eq!(model.name(), "Dummy");

        let config = Config {
            model_name: Some("nope".to_string()),
            ..Config::default()
        };
        assert!(create_model(Some(config)).await.is_err());
    }
}
