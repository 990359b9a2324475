//! Structured job-description data produced by the JD Interpreter (C1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
}

impl Default for ExperienceLevel {
    fn default() -> Self {
        ExperienceLevel::Mid
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JdData {
    #[serde(default)]
    pub role_title: String,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub role_category: String,
}

impl JdData {
    /// Text fed to the embedding cache to produce the JD vector:
    /// `role_title + " " + must_have_skills + " " + keywords`.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {}",
            self.role_title,
            self.must_have_skills.join(" "),
            self.keywords.join(" ")
        )
    }
}
