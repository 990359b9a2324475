//! Deterministic, non-network `AiProvider` used both when assisted mode is
//! disabled entirely (no `LLM_API_KEY`) and when an assisted call is
//! rejected (malformed JSON, wrong schema, bullet-count mismatch). Every
//! method is pure and reproducible: same input always produces the same
//! output, which keeps the pipeline runnable — and its tests repeatable —
//! with no external dependency.

use crate::ai::errors::AiProviderError;
use crate::ai::provider::AiProvider;
use crate::ai::types::*;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Fixed technology lexicon matched case-insensitively against JD text.
/// Intentionally not exhaustive — the fallback path trades recall for
/// being fully deterministic and explainable.
const TECH_LEXICON: &[&str] = &[
    "python", "java", "javascript", "typescript", "rust", "go", "golang", "c++", "c#",
    "ruby", "php", "kotlin", "swift", "scala", "sql", "postgresql", "mysql", "sqlite",
    "mongodb", "redis", "kafka", "docker", "kubernetes", "aws", "gcp", "azure",
    "terraform", "graphql", "rest", "rest apis", "grpc", "react", "vue", "angular",
    "node.js", "django", "fastapi", "flask", "spring", "tensorflow", "pytorch",
    "pandas", "numpy", "ci/cd", "git", "linux", "microservices", "distributed systems",
];

const SENIOR_KEYWORDS: &[&str] = &["senior", "lead", "principal", "staff"];
const ENTRY_KEYWORDS: &[&str] = &["junior", "entry", "intern", "graduate", "fresher"];

/// Fixed cyclic action-verb list for the deterministic bullet rewrite,
/// indexed by `i mod 10`.
const REWRITE_VERBS: &[&str] = &[
    "Developed", "Implemented", "Designed", "Engineered", "Built",
    "Optimized", "Led", "Managed", "Created", "Deployed",
];

pub struct FallbackProvider {
    embedding_dim: usize,
}

impl FallbackProvider {
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    fn detect_experience_level(text_lower: &str) -> &'static str {
        if SENIOR_KEYWORDS.iter().any(|k| text_lower.contains(k)) {
            "senior"
        } else if ENTRY_KEYWORDS.iter().any(|k| text_lower.contains(k)) {
            "entry"
        } else {
            "mid"
        }
    }

    fn detect_role_title(text: &str) -> String {
        text.lines()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .map(|l| l.chars().take(100).collect())
            .unwrap_or_default()
    }

    /// Union of the fixed lexicon matched against the lowercased text, in
    /// lexicon order (already unique).
    fn detect_keywords(text_lower: &str) -> Vec<String> {
        TECH_LEXICON
            .iter()
            .filter(|term| text_lower.contains(*term))
            .map(|term| term.to_string())
            .collect()
    }

    /// `i`-th bullet rewritten under the fixed deterministic rule: prepend
    /// a cyclic action verb when the first token begins lowercase or ends
    /// in "ing", lowercasing the first character of the remainder; always
    /// strip a single trailing period.
    fn rewrite_one(bullet: &str, index: usize) -> String {
        let trimmed = bullet.trim();
        let first_token = trimmed.split_whitespace().next().unwrap_or("");
        let starts_lowercase = first_token.chars().next().is_some_and(|c| c.is_lowercase());
        let ends_in_ing = first_token.ends_with("ing");

        let rewritten = if starts_lowercase || ends_in_ing {
            let verb = REWRITE_VERBS[index % REWRITE_VERBS.len()];
            let mut chars = trimmed.chars();
            match chars.next() {
                Some(first_char) => {
                    let lowered: String = first_char.to_lowercase().collect();
                    format!("{} {}{}", verb, lowered, chars.as_str())
                }
                None => verb.to_string(),
            }
        } else {
            trimmed.to_string()
        };

        rewritten.strip_suffix('.').map(|s| s.to_string()).unwrap_or(rewritten)
    }

    /// Deterministic pseudo-embedding: hash the text with SHA-256, expand
    /// the digest into `embedding_dim` floats by re-hashing with an
    /// incrementing counter, then L2-normalize. Carries no semantic
    /// meaning, but is stable, collision-resistant in practice, and always
    /// the configured dimension, which is all the fallback path promises.
    fn pseudo_embed(&self, text: &str) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.embedding_dim);
        let mut counter: u32 = 0;
        while values.len() < self.embedding_dim {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();
            for chunk in digest.chunks(4) {
                if values.len() >= self.embedding_dim {
                    break;
                }
                let mut bytes = [0u8; 4];
                bytes[..chunk.len()].copy_from_slice(chunk);
                let as_u32 = u32::from_le_bytes(bytes);
                // Map into [-1.0, 1.0)
                values.push((as_u32 as f32 / u32::MAX as f32) * 2.0 - 1.0);
            }
            counter += 1;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in values.iter_mut() {
                *v /= norm;
            }
        }
        values
    }
}

#[async_trait]
impl AiProvider for FallbackProvider {
    async fn analyze_jd(&self, input: JdAnalysisInput) -> Result<JdAnalysisOutput, AiProviderError> {
        let text_lower = input.raw_text.to_lowercase();
        let keywords = Self::detect_keywords(&text_lower);
        let must_have_skills: Vec<String> = keywords.iter().take(10).cloned().collect();

        Ok(JdAnalysisOutput {
            role_title: Self::detect_role_title(&input.raw_text),
            experience_level: Self::detect_experience_level(&text_lower).to_string(),
            must_have_skills,
            nice_to_have_skills: Vec::new(),
            keywords,
            role_category: "General".to_string(),
        })
    }

    async fn rewrite_bullets(&self, input: BulletRewriteInput) -> Result<BulletRewriteOutput, AiProviderError> {
        let rewritten_bullets = input
            .bullets
            .iter()
            .enumerate()
            .map(|(i, bullet)| Self::rewrite_one(bullet, i))
            .collect();

        Ok(BulletRewriteOutput { rewritten_bullets })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiProviderError> {
        Ok(self.pseudo_embed(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AiProviderError> {
        Ok(texts.iter().map(|t| self.pseudo_embed(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn analyze_jd_detects_skills_and_seniority() {
        let provider = FallbackProvider::new(16);
        let input = JdAnalysisInput {
            raw_text: "Senior Rust Engineer\nWe need Rust and Kubernetes experience. Rust is required.".to_string(),
        };
        let output = provider.analyze_jd(input).await.unwrap();
        assert_eq!(output.experience_level, "senior");
        assert_eq!(output.role_title, "Senior Rust Engineer");
        assert!(output.keywords.contains(&"rust".to_string()));
        assert!(output.must_have_skills.contains(&"rust".to_string()));
        assert!(output.nice_to_have_skills.is_empty());
        assert_eq!(output.role_category, "General");
    }

    #[tokio::test]
    async fn analyze_jd_truncates_must_have_skills_to_ten() {
        let provider = FallbackProvider::new(16);
        let raw_text = TECH_LEXICON[..15].join(", ");
        let output = provider.analyze_jd(JdAnalysisInput { raw_text }).await.unwrap();
        assert_eq!(output.must_have_skills.len(), 10);
        assert!(output.keywords.len() >= 10);
    }

    #[tokio::test]
    async fn rewrite_bullets_preserves_count_and_prepends_verb_for_ing_lead() {
        let provider = FallbackProvider::new(16);
        let input = BulletRewriteInput {
            role_title: "Engineer".to_string(),
            must_have_skills: vec!["rust".to_string()],
            bullets: vec![
                "Managing a team of engineers.".to_string(),
                "Shipped the billing service.".to_string(),
            ],
        };
        let output = provider.rewrite_bullets(input).await.unwrap();
        assert_eq!(output.rewritten_bullets.len(), 2);
        assert_eq!(output.rewritten_bullets[0], "Developed managing a team of engineers");
        assert!(!output.rewritten_bullets[0].ends_with('.'));
        assert_eq!(output.rewritten_bullets[1], "Shipped the billing service");
    }

    #[tokio::test]
    async fn rewrite_bullets_prepends_verb_when_first_token_lowercase() {
        let provider = FallbackProvider::new(16);
        let input = BulletRewriteInput {
            role_title: "Engineer".to_string(),
            must_have_skills: vec![],
            bullets: vec!["built the internal tooling platform.".to_string()],
        };
        let output = provider.rewrite_bullets(input).await.unwrap();
        assert_eq!(output.rewritten_bullets[0], "Developed built the internal tooling platform");
    }

    #[tokio::test]
    async fn embed_is_deterministic_and_correct_dimension() {
        let provider = FallbackProvider::new(32);
        let a = provider.embed("hello world").await.unwrap();
        let b = provider.embed("hello world").await.unwrap();
        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn embed_differs_for_different_text() {
        let provider = FallbackProvider::new(32);
        let a = provider.embed("hello world").await.unwrap();
        let b = provider.embed("goodbye world").await.unwrap();
        assert_ne!(a, b);
    }
}
