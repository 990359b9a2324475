//! Environment-sourced configuration for the resume generation service.
//!
//! Loaded once at startup with `dotenvy` (so a local `.env` works during
//! development) and read with `std::env`, in the load-with-defaults style
//! used elsewhere in this codebase, but without a SQLite-backed settings
//! table — this service has one deployment-wide configuration, not a
//! per-user settings row.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub max_experience_sections: usize,
    pub max_project_sections: usize,
    pub max_bullets_per_section: usize,
    pub max_skills: usize,
    pub output_dir: String,
    pub host: String,
    pub port: u16,
    pub llm_timeout: Duration,
    pub embedding_timeout: Duration,
    pub pdf_timeout: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64_secs(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl Config {
    /// Load from the process environment, falling back to `.env` in the
    /// working directory if present. Never fails: every key has a default
    /// that keeps the pipeline runnable in fallback (non-assisted) mode.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let llm_api_key = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| crate::secure_storage::get_secret("llm_api_key").ok().flatten());

        Self {
            database_url: env_or("DATABASE_URL", "local"),
            llm_api_key,
            llm_model: env_or("LLM_MODEL", "gemini-2.0-flash"),
            embedding_model: env_or("EMBEDDING_MODEL", "all-MiniLM-L6-v2"),
            embedding_dim: env_usize("EMBEDDING_DIM", 384),
            max_experience_sections: env_usize("MAX_EXPERIENCE_SECTIONS", 3),
            max_project_sections: env_usize("MAX_PROJECT_SECTIONS", 3),
            max_bullets_per_section: env_usize("MAX_BULLETS_PER_SECTION", 4),
            max_skills: env_usize("MAX_SKILLS", 12),
            output_dir: env_or("OUTPUT_DIR", "./output"),
            host: env_or("HOST", "127.0.0.1"),
            port: env_usize("PORT", 8080) as u16,
            llm_timeout: env_u64_secs("LLM_TIMEOUT_SECS", 30),
            embedding_timeout: env_u64_secs("EMBEDDING_TIMEOUT_SECS", 30),
            pdf_timeout: env_u64_secs("PDF_TIMEOUT_SECS", 30),
        }
    }

    /// True when the assisted (LLM-backed) backends should be used for JD
    /// interpretation and bullet rewriting. An empty `LLM_API_KEY` disables
    /// assisted mode entirely, falling back to the deterministic paths.
    pub fn assisted_mode_enabled(&self) -> bool {
        self.llm_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane_without_env() {
        std::env::remove_var("LLM_API_KEY");
        let cfg = Config::load();
        assert_eq!(cfg.max_experience_sections, 3);
        assert_eq!(cfg.max_bullets_per_section, 4);
        assert_eq!(cfg.max_skills, 12);
        assert_eq!(cfg.embedding_dim, 384);
    }
}
