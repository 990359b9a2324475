//! C6 — ATS Enforcer: idempotent finalization. Re-applies cardinality caps
//! defensively and computes the per-keyword coverage map used by the final
//! document.

use crate::config::Config;
use crate::domain::draft::ResumeDraft;

/// Re-apply truncations and recompute keyword coverage. Calling this
/// twice on the same draft yields an equal draft (idempotent), since both
/// truncation and coverage computation are pure functions of the draft's
/// current (already-capped) content.
pub fn enforce_ats(draft: &mut ResumeDraft, config: &Config) {
    draft.experience_sections.truncate(config.max_experience_sections);
    draft.project_sections.truncate(config.max_project_sections);
    for section in draft.experience_sections.iter_mut().chain(draft.project_sections.iter_mut()) {
        section.bullets.truncate(config.max_bullets_per_section);
    }
    draft.selected_skills.truncate(config.max_skills);

    draft.keyword_coverage = compute_keyword_coverage(draft);
}

/// Build the lowercased, space-joined blob of every selected section
/// title, every bullet's effective text, and every selected skill, then
/// test each JD keyword for substring membership.
fn compute_keyword_coverage(draft: &ResumeDraft) -> std::collections::HashMap<String, bool> {
    let mut blob_parts: Vec<String> = Vec::new();

    for section in draft.experience_sections.iter().chain(draft.project_sections.iter()) {
        blob_parts.push(section.title.clone());
        for bullet in &section.bullets {
            blob_parts.push(bullet.effective_text().to_string());
        }
    }
    blob_parts.extend(draft.selected_skills.iter().cloned());

    let blob = blob_parts.join(" ").to_lowercase();

    draft
        .jd_data
        .keywords
        .iter()
        .map(|kw| (kw.clone(), blob.contains(&kw.to_lowercase())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::{Confidence, ScoredBullet, ScoredSection, SectionType};
    use crate::domain::jd::{ExperienceLevel, JdData};
    use std::collections::HashMap;

    fn base_draft() -> ResumeDraft {
        ResumeDraft {
            profile_id: 1,
            jd_data: JdData {
                role_title: "Engineer".to_string(),
                experience_level: ExperienceLevel::Mid,
                must_have_skills: vec!["python".to_string()],
                nice_to_have_skills: vec![],
                keywords: vec!["python".to_string(), "kubernetes".to_string()],
                role_category: "general".to_string(),
            },
            jd_vector: vec![],
            experience_sections: vec![ScoredSection {
                id: 1,
                title: "Engineer".to_string(),
                subtitle: "Co".to_string(),
                section_type: SectionType::Experience,
                score: 0.5,
                bullets: vec![ScoredBullet {
                    id: 1,
                    original_text: "Built services with Python".to_string(),
                    score: 0.5,
                    confidence: Confidence::Strong,
                    rewritten_text: String::new(),
                }],
            }],
            project_sections: vec![],
            selected_skills: vec!["Python".to_string()],
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

    #[test]
    fn keyword_coverage_detects_present_and_absent_keywords() {
        let mut draft = base_draft();
        let config = Config::load();
        enforce_ats(&mut draft, &config);
        assert_eq!(draft.keyword_coverage.get("python"), Some(&true));
        assert_eq!(draft.keyword_coverage.get("kubernetes"), Some(&false));
    }

    #[test]
    fn enforce_ats_is_idempotent() {
        let mut draft = base_draft();
        let config = Config::load();
        enforce_ats(&mut draft, &config);
        let first = draft.clone();
        enforce_ats(&mut draft, &config);
        assert_eq!(first.keyword_coverage, draft.keyword_coverage);
        assert_eq!(first.selected_skills, draft.selected_skills);
        assert_eq!(first.experience_sections.len(), draft.experience_sections.len());
    }
}
