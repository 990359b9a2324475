use serde::{Deserialize, Serialize};

/// Input to JD interpretation (C1): the raw, unstructured job posting text.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JdAnalysisInput {
    pub raw_text: String,
}

/// Structured output of JD interpretation (C1). Field names match
/// `crate::domain::jd::JdData` so the assisted and fallback paths both
/// produce the same shape; `crate::jd_interpreter` maps this 1:1 into
/// `JdData` once the response has cleared validation.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JdAnalysisOutput {
    #[serde(default)]
    pub role_title: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub role_category: String,
}

/// Input to the bullet rewriter (C5): the bullets to rewrite plus the JD
/// context they should be tailored towards. `bullets` is ordered; the
/// output must return exactly this many rewritten bullets, in the same
/// order, so the caller can zip them back onto the originals.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BulletRewriteInput {
    pub role_title: String,
    pub must_have_skills: Vec<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BulletRewriteOutput {
    #[serde(default)]
    pub rewritten_bullets: Vec<String>,
}
