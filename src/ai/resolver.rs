use crate::ai::cloud_provider::CloudAiProvider;
use crate::ai::fallback_provider::FallbackProvider;
use crate::ai::provider::AiProvider;
use crate::config::Config;
use std::sync::Arc;

/// Provider resolver: picks the assisted (LLM-backed) provider when an API
/// key is configured, and the deterministic fallback provider otherwise.
pub enum ResolvedProvider {
    Assisted(Arc<CloudAiProvider>),
    Fallback(Arc<FallbackProvider>),
}

impl ResolvedProvider {
    /// Resolve the provider to use for this process from `Config`.
    pub fn resolve(config: &Config) -> Self {
        if let Some(api_key) = config.llm_api_key.clone().filter(|k| !k.is_empty()) {
            log::info!("[ResolvedProvider] Assisted mode: using model {}", config.llm_model);
            ResolvedProvider::Assisted(Arc::new(CloudAiProvider::new(
                api_key,
                config.llm_model.clone(),
                config.embedding_model.clone(),
                config.embedding_dim,
                config.llm_timeout,
                config.embedding_timeout,
            )))
        } else {
            log::info!("[ResolvedProvider] No LLM_API_KEY configured; using deterministic fallback provider");
            ResolvedProvider::Fallback(Arc::new(FallbackProvider::new(config.embedding_dim)))
        }
    }

    /// Get the provider as a trait object.
    pub fn as_provider(&self) -> Arc<dyn AiProvider> {
        match self {
            ResolvedProvider::Assisted(provider) => provider.clone() as Arc<dyn AiProvider>,
            ResolvedProvider::Fallback(provider) => provider.clone() as Arc<dyn AiProvider>,
        }
    }
}
