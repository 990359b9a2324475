//! The candidate `Profile` aggregate.
//!
//! `Profile` owns everything beneath it; deleting a profile transitively
//! destroys its experiences, projects, skills, and the rest. Ownership is
//! modeled as plain `Vec<T>` fields rather than an ORM relationship graph —
//! traversal for deletion/embedding-fill is explicit code in `repo/` and
//! `embedding/`, using narrow per-entity repositories instead of a generic
//! reflection-based CRUD layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub id: i64,
    pub personal_info: Option<PersonalInfo>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub achievements: Vec<Achievement>,
    pub external_profiles: Vec<ExternalProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// `start_date`/`end_date` are `YYYY-MM` strings or the literal `"Present"`.
/// `section_vector` is the mean of the bullet vectors, recomputed whenever
/// any bullet changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub bullets: Vec<ExperienceBullet>,
    pub section_vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceBullet {
    pub id: i64,
    pub text: String,
    pub vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub tech_stack: Option<String>,
    pub bullets: Vec<ProjectBullet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBullet {
    pub id: i64,
    pub text: String,
    pub vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: i64,
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub id: i64,
    pub name: String,
    pub issuing_organization: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub id: i64,
    pub platform: String,
    pub profile_url: String,
}
