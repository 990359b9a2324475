//! C4 — Relevance Selector: ranks profile entities by score, enforces
//! top-N/top-K cardinalities, dedupes-and-prioritizes skills, and computes
//! must-have-skill confidence.

use crate::ai::provider::AiProvider;
use crate::config::Config;
use crate::domain::draft::{Confidence, ResumeDraft, ScoredBullet, ScoredSection, SectionType};
use crate::domain::jd::JdData;
use crate::domain::profile::Profile;
use crate::embedding::cosine_similarity;
use crate::errors::PipelineError;
use crate::scoring::{score_bullet, score_section};
use std::collections::HashMap;

/// Semantic-probe capacity bound for must-have-skill confidence grading:
/// at most this many bullet texts are embedded per skill.
const MAX_SEMANTIC_PROBES: usize = 20;
const SEMANTIC_CONFIDENCE_THRESHOLD: f64 = 0.60;

/// Build a `ResumeDraft` for one profile against one interpreted JD. Total:
/// produces a valid draft for any profile, including an empty one.
pub async fn select_relevant_content(
    profile: &Profile,
    jd: &JdData,
    jd_vector: &[f32],
    config: &Config,
    provider: &dyn AiProvider,
) -> Result<ResumeDraft, PipelineError> {
    let mut experience_sections = score_experience_sections(profile, jd, jd_vector, config);
    experience_sections.sort_by(|a, b| b.score.total_cmp(&a.score));
    experience_sections.truncate(config.max_experience_sections);

    let mut project_sections = score_project_sections(profile, jd, jd_vector, config);
    project_sections.sort_by(|a, b| b.score.total_cmp(&a.score));
    project_sections.truncate(config.max_project_sections);

    let selected_skills = select_skills(profile, jd, config.max_skills);

    let all_profile_skill_names: Vec<&str> = profile.skills.iter().map(|s| s.name.as_str()).collect();

    let experience_bullet_texts = profile.experience.iter().flat_map(|e| e.bullets.iter().map(|b| b.text.as_str()));
    let project_bullet_texts = profile.projects.iter().flat_map(|p| p.bullets.iter().map(|b| b.text.as_str()));
    let all_bullet_texts: Vec<&str> = experience_bullet_texts.chain(project_bullet_texts).collect();

    let skill_confidence =
        compute_skill_confidence(jd, &all_profile_skill_names, &all_bullet_texts, provider).await;

    Ok(ResumeDraft {
        profile_id: profile.id,
        jd_data: jd.clone(),
        jd_vector: jd_vector.to_vec(),
        experience_sections,
        project_sections,
        selected_skills,
        skill_confidence,
        keyword_coverage: HashMap::new(),
        personal_info: profile.personal_info.clone(),
        education: profile.education.clone(),
        certifications: profile.certifications.clone(),
        achievements: profile.achievements.clone(),
        external_profiles: profile.external_profiles.clone(),
        job_title: jd.role_title.clone(),
    })
}

fn score_experience_sections(
    profile: &Profile,
    jd: &JdData,
    jd_vector: &[f32],
    config: &Config,
) -> Vec<ScoredSection> {
    profile
        .experience
        .iter()
        .map(|exp| {
            let title = exp.role.clone();
            let end = exp.end_date.clone().unwrap_or_else(|| "Present".to_string());
            let start = exp.start_date.clone().unwrap_or_default();
            let subtitle = format!("{} | {} – {}", exp.company, start, end);
            let section_text = format!("{} at {}", exp.role, exp.company);

            let mut bullets: Vec<ScoredBullet> = exp
                .bullets
                .iter()
                .map(|b| {
                    let score = score_bullet(
                        &b.text,
                        b.vector.as_deref(),
                        jd_vector,
                        jd,
                        SectionType::Experience,
                        exp.end_date.as_deref(),
                    );
                    ScoredBullet {
                        id: b.id,
                        original_text: b.text.clone(),
                        score,
                        confidence: Confidence::Weak,
                        rewritten_text: String::new(),
                    }
                })
                .collect();
            bullets.sort_by(|a, b| b.score.total_cmp(&a.score));
            bullets.truncate(config.max_bullets_per_section);

            let score = score_section(
                &section_text,
                exp.section_vector.as_deref(),
                jd_vector,
                jd,
                SectionType::Experience,
                exp.end_date.as_deref(),
            );

            ScoredSection {
                id: exp.id,
                title,
                subtitle,
                section_type: SectionType::Experience,
                score,
                bullets,
            }
        })
        .collect()
}

fn score_project_sections(
    profile: &Profile,
    jd: &JdData,
    jd_vector: &[f32],
    config: &Config,
) -> Vec<ScoredSection> {
    profile
        .projects
        .iter()
        .map(|proj| {
            let section_text = format!("{}: {}", proj.title, proj.description.clone().unwrap_or_default());
            let subtitle = proj.tech_stack.clone().unwrap_or_default();

            let mut bullets: Vec<ScoredBullet> = proj
                .bullets
                .iter()
                .map(|b| {
                    let score = score_bullet(
                        &b.text,
                        b.vector.as_deref(),
                        jd_vector,
                        jd,
                        SectionType::Project,
                        None,
                    );
                    ScoredBullet {
                        id: b.id,
                        original_text: b.text.clone(),
                        score,
                        confidence: Confidence::Weak,
                        rewritten_text: String::new(),
                    }
                })
                .collect();
            bullets.sort_by(|a, b| b.score.total_cmp(&a.score));
            bullets.truncate(config.max_bullets_per_section);

            // Projects carry no section-level vector; semantic score falls
            // back to the constant default via `score_section`.
            let score = score_section(&section_text, None, jd_vector, jd, SectionType::Project, None);

            ScoredSection {
                id: proj.id,
                title: proj.title.clone(),
                subtitle,
                section_type: SectionType::Project,
                score,
                bullets,
            }
        })
        .collect()
}

/// Two-pass skill selection: pass A pulls in skills matched against the
/// JD's must/nice-to-have lists (in profile order), pass B fills the
/// remainder up to `max_skills` with whatever profile skills are left (in
/// profile order). Case-insensitive uniqueness is enforced throughout.
fn select_skills(profile: &Profile, jd: &JdData, max_skills: usize) -> Vec<String> {
    let jd_skills_lower: Vec<String> = jd
        .must_have_skills
        .iter()
        .chain(jd.nice_to_have_skills.iter())
        .map(|s| s.to_lowercase())
        .collect();

    let mut selected = Vec::new();
    let mut seen_lower: Vec<String> = Vec::new();

    // Pass A
    for skill in &profile.skills {
        if selected.len() >= max_skills {
            break;
        }
        let name_lower = skill.name.to_lowercase();
        if seen_lower.contains(&name_lower) {
            continue;
        }
        let matches_jd = jd_skills_lower
            .iter()
            .any(|jd_skill| name_lower.contains(jd_skill.as_str()) || jd_skill.contains(name_lower.as_str()));
        if matches_jd {
            selected.push(skill.name.clone());
            seen_lower.push(name_lower);
        }
    }

    // Pass B
    for skill in &profile.skills {
        if selected.len() >= max_skills {
            break;
        }
        let name_lower = skill.name.to_lowercase();
        if seen_lower.contains(&name_lower) {
            continue;
        }
        selected.push(skill.name.clone());
        seen_lower.push(name_lower);
    }

    selected
}

/// Must-have-skill confidence grading per skill, graded against the full
/// profile rather than whatever survived top-N/top-K truncation — a skill
/// truncated out of the selected skills or bullets is still evidence:
/// 1. `strong` — any profile skill matches (or contains / is contained by)
///    the JD skill, case-insensitively.
/// 2. `inferred` — the skill text appears as a substring of any bullet in
///    the profile.
/// 3. `inferred` — semantic similarity between `embed(skill)` and any of
///    the first `MAX_SEMANTIC_PROBES` bullet texts exceeds the threshold.
/// 4. `weak` — none of the above. Embedding failures at this stage
///    downgrade the verdict toward `weak`, never propagate as an error.
async fn compute_skill_confidence(
    jd: &JdData,
    profile_skills: &[&str],
    bullet_texts: &[&str],
    provider: &dyn AiProvider,
) -> HashMap<String, Confidence> {
    let mut result = HashMap::new();

    for must_have in &jd.must_have_skills {
        let lower = must_have.to_lowercase();

        let strong = profile_skills.iter().any(|s| {
            let s_lower = s.to_lowercase();
            s_lower == lower || s_lower.contains(&lower) || lower.contains(&s_lower)
        });
        if strong {
            result.insert(must_have.clone(), Confidence::Strong);
            continue;
        }

        let textual_match = bullet_texts.iter().any(|b| b.to_lowercase().contains(&lower));
        if textual_match {
            result.insert(must_have.clone(), Confidence::Inferred);
            continue;
        }

        let semantic_match = semantic_probe(must_have, bullet_texts, provider).await;
        result.insert(
            must_have.clone(),
            if semantic_match { Confidence::Inferred } else { Confidence::Weak },
        );
    }

    result
}

async fn semantic_probe(skill: &str, bullet_texts: &[&str], provider: &dyn AiProvider) -> bool {
    let skill_vec = match provider.embed(skill).await {
        Ok(v) => v,
        Err(e) => {
            log::warn!("[selector] semantic probe embedding failed for '{}': {}", skill, e);
            return false;
        }
    };

    for text in bullet_texts.iter().take(MAX_SEMANTIC_PROBES) {
        let bullet_vec = match provider.embed(text).await {
            Ok(v) => v,
            Err(e) => {
                log::warn!("[selector] semantic probe embedding failed for bullet: {}", e);
                continue;
            }
        };
        if cosine_similarity(&skill_vec, &bullet_vec) > SEMANTIC_CONFIDENCE_THRESHOLD {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fallback_provider::FallbackProvider;
    use crate::domain::jd::ExperienceLevel;
    use crate::domain::profile::{Experience, ExperienceBullet, Skill};

    fn jd() -> JdData {
        JdData {
            role_title: "Senior Backend Engineer".to_string(),
            experience_level: ExperienceLevel::Senior,
            must_have_skills: vec!["Python".to_string(), "FastAPI".to_string()],
            nice_to_have_skills: vec!["Docker".to_string()],
            keywords: vec!["python".to_string(), "fastapi".to_string()],
            role_category: "backend".to_string(),
        }
    }

    fn profile_with_skills(names: &[&str]) -> Profile {
        Profile {
            id: 1,
            skills: names
                .iter()
                .enumerate()
                .map(|(i, n)| Skill { id: i as i64, name: n.to_string(), category: None, priority: None })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn skill_selection_prioritizes_jd_matches_then_fills_remainder() {
        let profile = profile_with_skills(&["Go", "Python", "Rust", "Docker"]);
        let selected = select_skills(&profile, &jd(), 3);
        assert_eq!(selected, vec!["Python", "Docker", "Go"]);
    }

    #[test]
    fn skill_selection_enforces_case_insensitive_uniqueness() {
        let profile = profile_with_skills(&["python", "Python", "PYTHON"]);
        let selected = select_skills(&profile, &jd(), 10);
        assert_eq!(selected.len(), 1);
    }

    #[tokio::test]
    async fn skill_confidence_strong_when_listed_in_profile() {
        let jd = jd();
        let profile_skills = vec!["Python"];
        let provider = FallbackProvider::new(8);
        let confidence = compute_skill_confidence(&jd, &profile_skills, &[], &provider).await;
        assert_eq!(confidence.get("Python"), Some(&Confidence::Strong));
    }

    #[tokio::test]
    async fn skill_confidence_strong_survives_skill_truncation() {
        // A must-have skill present in the full profile but dropped from
        // the truncated selected-skills list still grades as strong.
        let jd = jd();
        let profile_skills = vec!["Go", "Rust", "Python"];
        let provider = FallbackProvider::new(8);
        let confidence = compute_skill_confidence(&jd, &profile_skills, &[], &provider).await;
        assert_eq!(confidence.get("Python"), Some(&Confidence::Strong));
    }

    #[tokio::test]
    async fn skill_confidence_inferred_from_bullet_text() {
        let jd = jd();
        let bullets = vec!["Built REST services with FastAPI and PostgreSQL"];
        let provider = FallbackProvider::new(8);
        let confidence = compute_skill_confidence(&jd, &[], &bullets, &provider).await;
        assert_eq!(confidence.get("FastAPI"), Some(&Confidence::Inferred));
    }

    #[tokio::test]
    async fn skill_confidence_weak_with_no_evidence() {
        let jd = jd();
        let provider = FallbackProvider::new(8);
        let confidence = compute_skill_confidence(&jd, &[], &[], &provider).await;
        assert_eq!(confidence.get("Python"), Some(&Confidence::Weak));
    }

    #[tokio::test]
    async fn selector_is_total_for_empty_profile() {
        let profile = Profile { id: 1, ..Default::default() };
        let config = Config::load();
        let provider = FallbackProvider::new(config.embedding_dim);
        let jd = jd();
        let jd_vector = vec![0.0; config.embedding_dim];
        let draft = select_relevant_content(&profile, &jd, &jd_vector, &config, &provider)
            .await
            .unwrap();
        assert!(draft.experience_sections.is_empty());
        assert!(draft.project_sections.is_empty());
        assert!(draft.selected_skills.is_empty());
    }

    #[test]
    fn experience_sections_respect_bullet_and_section_caps() {
        let mut config = Config::load();
        config.max_bullets_per_section = 2;
        config.max_experience_sections = 1;

        let mut profile = Profile { id: 1, ..Default::default() };
        for exp_idx in 0..3 {
            profile.experience.push(Experience {
                id: exp_idx,
                company: format!("Company {}", exp_idx),
                role: "Engineer".to_string(),
                start_date: Some("2020-01".to_string()),
                end_date: Some("2021-01".to_string()),
                bullets: (0..4)
                    .map(|i| ExperienceBullet { id: i, text: format!("Did thing {}", i), vector: None })
                    .collect(),
                section_vector: None,
            });
        }

        let jd = jd();
        let jd_vector = vec![0.0; config.embedding_dim];
        let sections = score_experience_sections(&profile, &jd, &jd_vector, &config);
        for section in &sections {
            assert!(section.bullets.len() <= 2);
        }
    }
}
