//! `ResumeDraft` — the mutable working set threaded through the pipeline —
//! and `ResumeDocument`, the immutable tree handed to renderers.

use crate::domain::jd::JdData;
use crate::domain::profile::{Achievement, Certification, Education, ExternalProfile, PersonalInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Experience,
    Project,
}

impl SectionType {
    pub fn as_priority_key(&self) -> &'static str {
        match self {
            SectionType::Experience => "experience",
            SectionType::Project => "project",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Strong,
    Inferred,
    Weak,
}

/// A single scored bullet. `rewritten_text` is empty until C5 runs; readers
/// must fall back to `original_text` when it is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredBullet {
    pub id: i64,
    pub original_text: String,
    pub score: f64,
    pub confidence: Confidence,
    #[serde(default)]
    pub rewritten_text: String,
}

impl ScoredBullet {
    /// `rewritten_text` if non-empty, else `original_text` — the rule
    /// applied everywhere an "effective" bullet text is needed (keyword
    /// coverage, assembly, rendering).
    pub fn effective_text(&self) -> &str {
        if self.rewritten_text.is_empty() {
            &self.original_text
        } else {
            &self.rewritten_text
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSection {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub section_type: SectionType,
    pub score: f64,
    pub bullets: Vec<ScoredBullet>,
}

/// The mutable working set passed through C3 → C6. Carries JD context,
/// the two scored-and-truncated section lists, the deduplicated skill
/// list, per-must-have-skill confidence, and per-keyword coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDraft {
    pub profile_id: i64,
    pub jd_data: JdData,
    pub jd_vector: Vec<f32>,

    pub experience_sections: Vec<ScoredSection>,
    pub project_sections: Vec<ScoredSection>,
    pub selected_skills: Vec<String>,
    pub skill_confidence: HashMap<String, Confidence>,
    pub keyword_coverage: HashMap<String, bool>,

    pub personal_info: Option<PersonalInfo>,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub achievements: Vec<Achievement>,
    pub external_profiles: Vec<ExternalProfile>,

    pub job_title: String,
}

/// One resolved section in the final, render-ready document. Bullets are
/// plain strings (rewritten if present, else original); no vectors survive
/// assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "section_type", rename_all = "snake_case")]
pub enum ResumeDocumentSection {
    PersonalInfo { info: PersonalInfo },
    Education { entries: Vec<Education> },
    Experience { entries: Vec<ResolvedEntry> },
    Projects { entries: Vec<ResolvedEntry> },
    Skills { skills: Vec<String>, confidence: HashMap<String, Confidence> },
    Certifications { entries: Vec<Certification> },
    Achievements { entries: Vec<Achievement> },
    ExternalProfiles { entries: Vec<ExternalProfile> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub title: String,
    pub subtitle: String,
    pub bullets: Vec<String>,
}

/// The immutable render input assembled by C7, in canonical ATS section
/// order. Sections whose source was empty are elided entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub job_title: String,
    pub sections: Vec<ResumeDocumentSection>,
    pub keyword_coverage: HashMap<String, bool>,
}

/// A persisted resume row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: i64,
    pub profile_id: i64,
    pub jd_id: i64,
    pub job_title: String,
    pub version: i64,
    pub file_path: String,
    pub pdf_path: Option<String>,
    pub docx_path: Option<String>,
    pub created_at: String,
}

/// One `ResumeSection` row as persisted alongside a `ResumeRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSectionRow {
    pub section_type: String,
    pub content_blob: serde_json::Value,
    pub confidence_flags: Option<serde_json::Value>,
}
