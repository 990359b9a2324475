//! Core domain types threaded through the resume generation pipeline.
//!
//! `profile` holds the persisted candidate aggregate, `jd` the structured
//! job description, and `draft` the mutable working set and its immutable,
//! render-ready counterpart.

pub mod draft;
pub mod jd;
pub mod profile;

pub use draft::{
    Confidence, ResolvedEntry, ResumeDocument, ResumeDocumentSection, ResumeDraft, ResumeRecord,
    ResumeSectionRow, ScoredBullet, ScoredSection, SectionType,
};
pub use jd::{ExperienceLevel, JdData};
pub use profile::{
    Achievement, Certification, Education, Experience, ExperienceBullet, ExternalProfile,
    PersonalInfo, Profile, Project, ProjectBullet, Skill,
};
