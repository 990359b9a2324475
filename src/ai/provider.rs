use crate::ai::errors::AiProviderError;
use crate::ai::types::*;

/// Main AI Provider trait (async version)
/// All AI-backed functionality goes through this abstraction: JD
/// interpretation, bullet rewriting, and the two embedding entry points
/// used by the embedding cache (C2).
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Interpret a raw job description into structured `JdAnalysisOutput`.
    async fn analyze_jd(&self, input: JdAnalysisInput) -> Result<JdAnalysisOutput, AiProviderError>;

    /// Rewrite a batch of bullets to better reflect the target role.
    /// Implementations must return exactly `input.bullets.len()` entries,
    /// in the same order as the input.
    async fn rewrite_bullets(&self, input: BulletRewriteInput) -> Result<BulletRewriteOutput, AiProviderError>;

    /// Embed a single piece of text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiProviderError>;

    /// Embed a batch of texts in one call where the backend supports it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AiProviderError>;
}
