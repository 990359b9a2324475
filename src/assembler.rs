//! C7 — Assembler: pure transform from the mutable `ResumeDraft` to the
//! immutable, render-ready `ResumeDocument`.

use crate::domain::draft::{ResolvedEntry, ResumeDocument, ResumeDocumentSection, ResumeDraft, ResumeSectionRow};

/// Canonical ATS section order. Sections whose source is empty are
/// elided from the output entirely.
pub fn assemble(draft: &ResumeDraft) -> ResumeDocument {
    let mut sections = Vec::new();

    if let Some(info) = &draft.personal_info {
        sections.push(ResumeDocumentSection::PersonalInfo { info: info.clone() });
    }
    if !draft.education.is_empty() {
        sections.push(ResumeDocumentSection::Education { entries: draft.education.clone() });
    }
    if !draft.experience_sections.is_empty() {
        sections.push(ResumeDocumentSection::Experience {
            entries: draft.experience_sections.iter().map(resolve_section_entry).collect(),
        });
    }
    if !draft.project_sections.is_empty() {
        sections.push(ResumeDocumentSection::Projects {
            entries: draft.project_sections.iter().map(resolve_section_entry).collect(),
        });
    }
    if !draft.selected_skills.is_empty() {
        sections.push(ResumeDocumentSection::Skills {
            skills: draft.selected_skills.clone(),
            confidence: draft.skill_confidence.clone(),
        });
    }
    if !draft.certifications.is_empty() {
        sections.push(ResumeDocumentSection::Certifications { entries: draft.certifications.clone() });
    }
    if !draft.achievements.is_empty() {
        sections.push(ResumeDocumentSection::Achievements { entries: draft.achievements.clone() });
    }
    if !draft.external_profiles.is_empty() {
        sections.push(ResumeDocumentSection::ExternalProfiles { entries: draft.external_profiles.clone() });
    }

    ResumeDocument {
        job_title: draft.job_title.clone(),
        sections,
        keyword_coverage: draft.keyword_coverage.clone(),
    }
}

fn resolve_section_entry(section: &crate::domain::draft::ScoredSection) -> ResolvedEntry {
    ResolvedEntry {
        title: section.title.clone(),
        subtitle: section.subtitle.clone(),
        bullets: section.bullets.iter().map(|b| b.effective_text().to_string()).collect(),
    }
}

/// Flatten a `ResumeDocument` into persistable `(section_type,
/// content_blob, confidence_flags?)` rows, one per non-empty section
/// already encoded in `sections`. The `skills` section carries the
/// confidence map; every other section carries `null`.
pub fn to_section_rows(document: &ResumeDocument) -> Vec<ResumeSectionRow> {
    document
        .sections
        .iter()
        .map(|section| {
            let (section_type, content_blob, confidence_flags) = match section {
                ResumeDocumentSection::PersonalInfo { info } => {
                    ("personal_info", serde_json::json!(info), None)
                }
                ResumeDocumentSection::Education { entries } => {
                    ("education", serde_json::json!(entries), None)
                }
                ResumeDocumentSection::Experience { entries } => {
                    ("experience", serde_json::json!(entries), None)
                }
                ResumeDocumentSection::Projects { entries } => {
                    ("projects", serde_json::json!(entries), None)
                }
                ResumeDocumentSection::Skills { skills, confidence } => {
                    ("skills", serde_json::json!(skills), Some(serde_json::json!(confidence)))
                }
                ResumeDocumentSection::Certifications { entries } => {
                    ("certifications", serde_json::json!(entries), None)
                }
                ResumeDocumentSection::Achievements { entries } => {
                    ("achievements", serde_json::json!(entries), None)
                }
                ResumeDocumentSection::ExternalProfiles { entries } => {
                    ("external_profiles", serde_json::json!(entries), None)
                }
            };
            ResumeSectionRow {
                section_type: section_type.to_string(),
                content_blob,
                confidence_flags,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::{Confidence, ScoredBullet, ScoredSection, SectionType};
    use crate::domain::jd::{ExperienceLevel, JdData};
    use std::collections::HashMap;

    fn empty_draft() -> ResumeDraft {
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
            experience_sections: vec![],
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

    #[test]
    fn empty_draft_assembles_to_no_sections() {
        let document = assemble(&empty_draft());
        assert!(document.sections.is_empty());
    }

    #[test]
    fn non_empty_experience_section_is_included_with_effective_text() {
        let mut draft = empty_draft();
        draft.experience_sections.push(ScoredSection {
            id: 1,
            title: "Engineer".to_string(),
            subtitle: "Co".to_string(),
            section_type: SectionType::Experience,
            score: 0.5,
            bullets: vec![ScoredBullet {
                id: 1,
                original_text: "Built the thing".to_string(),
                score: 0.5,
                confidence: Confidence::Strong,
                rewritten_text: "Delivered the thing".to_string(),
            }],
        });
        let document = assemble(&draft);
        assert_eq!(document.sections.len(), 1);
        match &document.sections[0] {
            ResumeDocumentSection::Experience { entries } => {
                assert_eq!(entries[0].bullets[0], "Delivered the thing");
            }
            _ => panic!("expected experience section"),
        }
    }

    #[test]
    fn assembling_twice_yields_equal_documents() {
        let mut draft = empty_draft();
        draft.selected_skills.push("Python".to_string());
        let first = assemble(&draft);
        let second = assemble(&draft);
        assert_eq!(serde_json::to_value(&first).unwrap(), serde_json::to_value(&second).unwrap());
    }

    #[test]
    fn skills_section_carries_confidence_all_others_do_not() {
        let mut draft = empty_draft();
        draft.selected_skills.push("Python".to_string());
        draft.skill_confidence.insert("Python".to_string(), Confidence::Strong);
        let document = assemble(&draft);
        let rows = to_section_rows(&document);
        let skills_row = rows.iter().find(|r| r.section_type == "skills").unwrap();
        assert!(skills_row.confidence_flags.is_some());
    }
}
