//! C5 — Bullet Rewriter: rewrites selected bullets under anti-fabrication
//! constraints, validates LLM output schema, and falls back deterministically
//! on any rejection. Rewrite rejection is silent — the caller never sees an
//! error, only the fallback's output.

use crate::ai::provider::AiProvider;
use crate::ai::types::BulletRewriteInput;
use crate::domain::draft::ResumeDraft;

/// Rewrite every bullet across the draft's experience and project sections
/// in place. Tries the assisted provider first; any schema mismatch (wrong
/// array length, parse failure, network error) discards that output
/// entirely and re-runs the deterministic fallback instead.
pub async fn rewrite_bullets(
    draft: &mut ResumeDraft,
    provider: &dyn AiProvider,
    fallback: &dyn AiProvider,
) {
    let flattened: Vec<String> = draft
        .experience_sections
        .iter()
        .chain(draft.project_sections.iter())
        .flat_map(|s| s.bullets.iter())
        .map(|b| b.original_text.clone())
        .collect();

    if flattened.is_empty() {
        return;
    }

    let input = BulletRewriteInput {
        role_title: draft.job_title.clone(),
        must_have_skills: draft.jd_data.must_have_skills.clone(),
        bullets: flattened.clone(),
    };

    let rewritten = match provider.rewrite_bullets(input.clone()).await {
        Ok(output) if output.rewritten_bullets.len() == flattened.len() => output.rewritten_bullets,
        Ok(output) => {
            log::warn!(
                "[rewriter] assisted rewrite returned {} bullets, expected {}; using fallback",
                output.rewritten_bullets.len(),
                flattened.len()
            );
            fallback_rewrite(input, fallback).await
        }
        Err(e) => {
            log::warn!("[rewriter] assisted rewrite failed, using fallback: {}", e);
            fallback_rewrite(input, fallback).await
        }
    };

    let mut iter = rewritten.into_iter();
    for section in draft.experience_sections.iter_mut().chain(draft.project_sections.iter_mut()) {
        for bullet in section.bullets.iter_mut() {
            if let Some(text) = iter.next() {
                bullet.rewritten_text = text;
            }
            // Post-step: any bullet whose rewritten_text is still empty
            // copies its original text verbatim, keeping the rewrite
            // operation idempotent and assembly total.
            if bullet.rewritten_text.is_empty() {
                bullet.rewritten_text = bullet.original_text.clone();
            }
        }
    }
}

async fn fallback_rewrite(input: BulletRewriteInput, fallback: &dyn AiProvider) -> Vec<String> {
    match fallback.rewrite_bullets(input.clone()).await {
        Ok(output) if output.rewritten_bullets.len() == input.bullets.len() => output.rewritten_bullets,
        _ => input.bullets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fallback_provider::FallbackProvider;
    use crate::domain::draft::{Confidence, ScoredBullet, ScoredSection, SectionType};
    use crate::domain::jd::{ExperienceLevel, JdData};
    use std::collections::HashMap;

    fn draft_with_bullets(bullets: Vec<&str>) -> ResumeDraft {
        ResumeDraft {
            profile_id: 1,
            jd_data: JdData {
                role_title: "Engineer".to_string(),
                experience_level: ExperienceLevel::Mid,
                must_have_skills: vec![],
                nice_to_have_skills: vec![],
                keywords: vec![],
                role_category: "general".to_string(),
            },
            jd_vector: vec![],
            experience_sections: vec![ScoredSection {
                id: 1,
                title: "Engineer".to_string(),
                subtitle: "Co | 2020 - Present".to_string(),
                section_type: SectionType::Experience,
                score: 0.5,
                bullets: bullets
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| ScoredBullet {
                        id: i as i64,
                        original_text: text.to_string(),
                        score: 0.5,
                        confidence: Confidence::Weak,
                        rewritten_text: String::new(),
                    })
                    .collect(),
            }],
            project_sections: vec![],
            selected_skills: vec![],
            skill_confidence: HashMap::new(),
            keyword_coverage: HashMap::new(),
            personal_info: None,
            education: vec![],
            certifications: vec![],
            achievements: vec![],
            external_profiles: vec![],
            job_title: "Engineer".to_string(),
        }
    }

    #[tokio::test]
    async fn rewrite_fills_every_bullet_and_preserves_count() {
        let mut draft = draft_with_bullets(vec!["Managing a team.", "built the platform."]);
        let fallback = FallbackProvider::new(8);
        rewrite_bullets(&mut draft, &fallback, &fallback).await;
        for bullet in &draft.experience_sections[0].bullets {
            assert!(!bullet.rewritten_text.is_empty());
        }
    }

    #[tokio::test]
    async fn empty_bullet_list_is_a_no_op() {
        let mut draft = draft_with_bullets(vec![]);
        let fallback = FallbackProvider::new(8);
        rewrite_bullets(&mut draft, &fallback, &fallback).await;
        assert!(draft.experience_sections[0].bullets.is_empty());
    }

    #[tokio::test]
    async fn rejected_assisted_output_falls_back_without_erroring() {
        struct WrongCount;
        #[async_trait::async_trait]
        impl AiProvider for WrongCount {
            async fn analyze_jd(
                &self,
                _input: crate::ai::types::JdAnalysisInput,
            ) -> Result<crate::ai::types::JdAnalysisOutput, crate::ai::errors::AiProviderError> {
                unreachable!()
            }
            async fn rewrite_bullets(
                &self,
                _input: BulletRewriteInput,
            ) -> Result<crate::ai::types::BulletRewriteOutput, crate::ai::errors::AiProviderError> {
                Ok(crate::ai::types::BulletRewriteOutput { rewritten_bullets: vec!["only one".to_string()] })
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

        let mut draft = draft_with_bullets(vec!["First bullet.", "Second bullet."]);
        let primary = WrongCount;
        let fallback = FallbackProvider::new(8);
        rewrite_bullets(&mut draft, &primary, &fallback).await;
        assert_eq!(draft.experience_sections[0].bullets.len(), 2);
        for bullet in &draft.experience_sections[0].bullets {
            assert!(!bullet.rewritten_text.is_empty());
        }
    }
}
