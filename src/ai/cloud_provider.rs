use crate::ai::errors::AiProviderError;
use crate::ai::provider::AiProvider;
use crate::ai::retry::{retry_with_backoff, RetryConfig};
use crate::ai::types::*;
use crate::ai::validation::{validate_bullet_rewrite, validate_jd_analysis};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Strips a single leading/trailing Markdown code fence from an LLM
/// response. LLMs asked for "JSON only" frequently wrap it in
/// ```json ... ``` anyway; treat the fence as formatting noise rather
/// than a validation failure.
fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        let rest = rest.trim_start_matches(['\n', '\r']);
        if let Some(body) = rest.strip_suffix("```") {
            return body.trim();
        }
        return rest.trim();
    }
    trimmed
}

/// Assisted-mode AI provider: calls a remote, OpenAI-compatible chat
/// completions endpoint for JD interpretation and bullet rewriting, and
/// the matching embeddings endpoint for vectorization. Every untrusted
/// response is treated as plain text until it has cleared
/// `serde_json::from_str` against the expected shape — a malformed
/// response is a recoverable `AiProviderError`, never a panic.
pub struct CloudAiProvider {
    api_key: String,
    model_name: String,
    embedding_model: String,
    embedding_dim: usize,
    llm_timeout: Duration,
    embedding_timeout: Duration,
    client: Client,
}

impl CloudAiProvider {
    pub fn new(
        api_key: String,
        model_name: String,
        embedding_model: String,
        embedding_dim: usize,
        llm_timeout: Duration,
        embedding_timeout: Duration,
    ) -> Self {
        Self {
            api_key,
            model_name,
            embedding_model,
            embedding_dim,
            llm_timeout,
            embedding_timeout,
            client: Client::new(),
        }
    }

    /// Send one chat-completions request, retrying transient failures
    /// (network errors, rate limits) with exponential backoff.
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<Value, AiProviderError> {
        retry_with_backoff(
            || self.chat_json_once(system_prompt, user_prompt),
            RetryConfig::default(),
        )
        .await
    }

    async fn chat_json_once(&self, system_prompt: &str, user_prompt: &str) -> Result<Value, AiProviderError> {
        let url = "https://api.openai.com/v1/chat/completions";

        let request = self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.model_name,
                "messages": [
                    { "role": "system", "content": system_prompt },
                    { "role": "user", "content": user_prompt }
                ],
                "temperature": 0.2,
                "response_format": { "type": "json_object" }
            }))
            .send();

        let response = tokio::time::timeout(self.llm_timeout, request)
            .await
            .map_err(|_| AiProviderError::NetworkError("LLM request timed out".to_string()))?
            .map_err(|e| AiProviderError::NetworkError(e.to_string()))?;

        if response.status() == 401 {
            return Err(AiProviderError::InvalidApiKey);
        }
        if response.status() == 429 {
            return Err(AiProviderError::RateLimitExceeded);
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiProviderError::NetworkError(format!("API error: {}", error_text)));
        }

        let json_response: Value = response
            .json()
            .await
            .map_err(|e| AiProviderError::InvalidResponse(e.to_string()))?;

        let content = json_response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| AiProviderError::InvalidResponse("Missing content in response".to_string()))?;

        let stripped = strip_json_fences(content);
        serde_json::from_str(stripped)
            .map_err(|e| AiProviderError::InvalidResponse(format!("Failed to parse JSON: {} (content: {})", e, stripped)))
    }

    fn jd_system_prompt() -> &'static str {
        "You are a job description analyst. Extract role_title, experience_level \
(one of entry, mid, senior), must_have_skills, nice_to_have_skills, keywords, \
and role_category from the job description.\n\
CRITICAL RULES:\n\
- Extract only information explicitly present in the job description\n\
- NEVER invent skills or requirements that are not mentioned\n\
- Output MUST be a single JSON object with exactly those six camelCase fields"
    }

    fn rewrite_system_prompt() -> &'static str {
        "You are a resume bullet editor. Rewrite each bullet to better reflect \
the target role and its must-have skills, using stronger action verbs and \
quantifying impact where the original text already implies a number.\n\
CRITICAL RULES:\n\
- NEVER invent companies, technologies, metrics, or achievements not present \
in the original bullet\n\
- Preserve the factual content of every bullet\n\
- Return exactly one rewritten bullet per input bullet, in the same order\n\
- Output MUST be a single JSON object: {\"rewrittenBullets\": [\"...\", ...]}"
    }
}

#[async_trait]
impl AiProvider for CloudAiProvider {
    async fn analyze_jd(&self, input: JdAnalysisInput) -> Result<JdAnalysisOutput, AiProviderError> {
        let user_prompt = format!(
            "Job description:\n{}\n\nExtract the structured fields as JSON.",
            input.raw_text
        );
        let value = self.chat_json(Self::jd_system_prompt(), &user_prompt).await?;
        validate_jd_analysis(&value)
    }

    async fn rewrite_bullets(&self, input: BulletRewriteInput) -> Result<BulletRewriteOutput, AiProviderError> {
        let user_prompt = format!(
            "Target role: {}\nMust-have skills: {}\n\nBullets:\n{}",
            input.role_title,
            input.must_have_skills.join(", "),
            input.bullets.iter().enumerate()
                .map(|(i, b)| format!("{}. {}", i + 1, b))
                .collect::<Vec<_>>()
                .join("\n")
        );
        let value = self.chat_json(Self::rewrite_system_prompt(), &user_prompt).await?;
        validate_bullet_rewrite(&value, input.bullets.len())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiProviderError> {
        let mut vectors = self.embed_batch(std::slice::from_ref(&text.to_string())).await?;
        vectors.pop().ok_or_else(|| AiProviderError::InvalidResponse("Empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AiProviderError> {
        retry_with_backoff(|| self.embed_batch_once(texts), RetryConfig::default()).await
    }
}

impl CloudAiProvider {
    async fn embed_batch_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AiProviderError> {
        let url = "https://api.openai.com/v1/embeddings";

        let request = self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.embedding_model,
                "input": texts,
            }))
            .send();

        let response = tokio::time::timeout(self.embedding_timeout, request)
            .await
            .map_err(|_| AiProviderError::NetworkError("Embedding request timed out".to_string()))?
            .map_err(|e| AiProviderError::NetworkError(e.to_string()))?;

        if response.status() == 401 {
            return Err(AiProviderError::InvalidApiKey);
        }
        if response.status() == 429 {
            return Err(AiProviderError::RateLimitExceeded);
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiProviderError::NetworkError(format!("API error: {}", error_text)));
        }

        let json_response: Value = response
            .json()
            .await
            .map_err(|e| AiProviderError::InvalidResponse(e.to_string()))?;

        let data = json_response
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AiProviderError::InvalidResponse("Missing data array in embeddings response".to_string()))?;

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            let embedding = item
                .get("embedding")
                .and_then(|e| e.as_array())
                .ok_or_else(|| AiProviderError::InvalidResponse("Missing embedding array".to_string()))?;
            let vector: Vec<f32> = embedding
                .iter()
                .filter_map(|v| v.as_f64())
                .map(|v| v as f32)
                .collect();
            if vector.len() != self.embedding_dim {
                return Err(AiProviderError::ValidationError(format!(
                    "Embedding backend returned dimension {}, expected {}",
                    vector.len(),
                    self.embedding_dim
                )));
            }
            vectors.push(vector);
        }

        Ok(vectors)
    }
}
