//! C1 — JD Interpreter: turns raw job description text into structured
//! `JdData`. Tries the assisted (LLM-backed) provider first when configured;
//! any failure — network, schema, or empty-field-after-parse — downgrades
//! to the deterministic rule-based fallback silently. Never fatal once the
//! minimum-length precondition has passed.

use crate::ai::provider::AiProvider;
use crate::ai::types::JdAnalysisInput;
use crate::domain::jd::{ExperienceLevel, JdData};
use crate::errors::{PipelineError, ValidationError};

const MIN_JD_LENGTH: usize = 20;

fn parse_experience_level(raw: &str) -> ExperienceLevel {
    match raw.to_lowercase().as_str() {
        "entry" => ExperienceLevel::Entry,
        "senior" => ExperienceLevel::Senior,
        _ => ExperienceLevel::Mid,
    }
}

/// Analyze a raw JD. `provider` is the resolved assisted provider (may
/// itself be the fallback provider when no LLM is configured);
/// `fallback` is always the deterministic provider, used whenever the
/// assisted call fails or is rejected.
pub async fn analyze_jd(
    raw_text: &str,
    provider: &dyn AiProvider,
    fallback: &dyn AiProvider,
) -> Result<JdData, PipelineError> {
    if raw_text.trim().len() < MIN_JD_LENGTH {
        return Err(PipelineError::Validation(ValidationError::General(format!(
            "job description must be at least {} characters",
            MIN_JD_LENGTH
        ))));
    }

    let input = JdAnalysisInput { raw_text: raw_text.to_string() };

    let output = match provider.analyze_jd(input.clone()).await {
        Ok(output) => output,
        Err(e) => {
            log::warn!("[jd_interpreter] assisted JD analysis failed, using fallback: {}", e);
            fallback.analyze_jd(input).await.map_err(|e| {
                PipelineError::Application(format!("fallback JD analysis unexpectedly failed: {}", e))
            })?
        }
    };

    Ok(JdData {
        role_title: output.role_title,
        experience_level: parse_experience_level(&output.experience_level),
        must_have_skills: output.must_have_skills,
        nice_to_have_skills: output.nice_to_have_skills,
        keywords: output.keywords,
        role_category: output.role_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fallback_provider::FallbackProvider;

    #[tokio::test]
    async fn rejects_jd_shorter_than_minimum() {
        let fallback = FallbackProvider::new(16);
        let result = analyze_jd("too short", &fallback, &fallback).await;
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[tokio::test]
    async fn falls_back_when_primary_provider_errors() {
        struct AlwaysFails;
        #[async_trait::async_trait]
        impl AiProvider for AlwaysFails {
            async fn analyze_jd(
                &self,
                _input: JdAnalysisInput,
            ) -> Result<crate::ai::types::JdAnalysisOutput, crate::ai::errors::AiProviderError> {
                Err(crate::ai::errors::AiProviderError::NetworkError("down".to_string()))
            }
            async fn rewrite_bullets(
                &self,
                _input: crate::ai::types::BulletRewriteInput,
            ) -> Result<crate::ai::types::BulletRewriteOutput, crate::ai::errors::AiProviderError> {
                unreachable!()
            }
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, crate::ai::errors::AiProviderError> {
                unreachable!()
            }
            async fn embed_batch(
                &self,
                _texts: &[String],
            ) -> Result<Vec<Vec<f32>>, crate::ai::errors::AiProviderError> {
                unreachable!()
            }
        }

        let primary = AlwaysFails;
        let fallback = FallbackProvider::new(16);
        let jd = analyze_jd(
            "Senior Rust Engineer building distributed systems at scale.",
            &primary,
            &fallback,
        )
        .await
        .unwrap();
        assert_eq!(jd.experience_level, ExperienceLevel::Senior);
    }
}
